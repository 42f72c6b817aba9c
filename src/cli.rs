//! 命令行参数

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 作业批量评分助手
#[derive(Parser, Debug)]
#[command(name = "rubric-grader")]
#[command(about = "根据评分量规调用大模型批量批改作业")]
#[command(version)]
pub struct Cli {
    /// 配置文件（TOML）
    #[arg(short, long, env = "GRADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 批量评分所有还没有结果的学生
    Grade {
        /// 会话文件（任务、评分维度、学生）
        #[arg(short, long)]
        session: PathBuf,
        /// 从 CSV 导入学生作答
        #[arg(short, long)]
        import: Option<PathBuf>,
        /// 结果导出路径
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
        /// 评分完成后进行班级分析
        #[arg(long)]
        analyze: bool,
    },
    /// 为某个评分维度生成五个等级描述
    Levels {
        #[arg(short, long)]
        session: PathBuf,
        /// 评分维度序号（从 1 开始）
        #[arg(short, long, default_value_t = 1, conflicts_with = "focus")]
        criterion: usize,
        /// 按评分重点选择维度，会话中没有时作为新维度
        #[arg(short, long)]
        focus: Option<String>,
        /// 把生成的描述写回会话文件
        #[arg(short, long)]
        write: bool,
    },
    /// 显示总分的等级分数段
    Thresholds {
        #[arg(short, long)]
        session: PathBuf,
    },
    /// 根据已导出的结果进行班级分析
    Analyze {
        #[arg(short, long)]
        session: PathBuf,
        /// 评分结果 CSV
        #[arg(short, long)]
        results: PathBuf,
    },
    /// 模板管理
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// 列出所有模板
    List,
    /// 把会话中的任务和评分维度保存为模板
    Save {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        session: PathBuf,
    },
    /// 显示模板内容
    Show {
        #[arg(long)]
        id: String,
    },
    /// 重命名模板
    Rename {
        #[arg(long)]
        id: String,
        #[arg(short, long)]
        name: String,
    },
    /// 删除模板
    Delete {
        #[arg(long)]
        id: String,
    },
    /// 把模板应用到会话文件
    Apply {
        #[arg(long)]
        id: String,
        #[arg(short, long)]
        session: PathBuf,
    },
    /// 把模板导出为会话文件
    Export {
        #[arg(long)]
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}
