//! 应用入口 - 编排层
//!
//! 负责命令分发：加载会话和模板、创建 LLM 服务、
//! 调用批量评分器并输出结果

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::cli::{Command, TemplateAction};
use crate::config::Config;
use crate::models::{load_session, save_session, GradeStatus, GradingSession};
use crate::orchestrator::batch_grader::BatchGrader;
use crate::services::{
    csv_io, summarize, thresholds, GradingModel, LlmService, TemplateStore, WarnWriter,
};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    llm: LlmService,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        let llm = LlmService::new(&config);
        Self { config, llm }
    }

    /// 执行命令
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Grade {
                session,
                import,
                output,
                analyze,
            } => {
                self.grade(&session, import.as_deref(), &output, analyze)
                    .await
            }
            Command::Levels {
                session,
                criterion,
                focus,
                write,
            } => {
                self.generate_levels(&session, criterion, focus, write)
                    .await
            }
            Command::Thresholds { session } => self.show_thresholds(&session).await,
            Command::Analyze { session, results } => self.analyze(&session, &results).await,
            Command::Template { action } => self.template(action).await,
        }
    }

    /// 批量评分
    async fn grade(
        &self,
        session_path: &Path,
        import: Option<&Path>,
        output: &Path,
        analyze: bool,
    ) -> Result<()> {
        logging::init_log_file(&self.config.output_log_file)?;
        logging::log_startup(self.llm.model_name(), self.config.request_delay());

        let mut session = load_session(session_path).await?;

        if let Some(csv_path) = import {
            let students = read_students_csv(csv_path, session.tasks.len()).await?;
            info!("📥 从 {} 导入 {} 名学生", csv_path.display(), students.len());
            session.extend_students(students);
        }

        if session.students.is_empty() {
            warn!("⚠️ 没有学生需要评分，程序结束");
            return Ok(());
        }

        let grader = BatchGrader::new(&self.llm, self.config.request_delay());
        let stats = grader.grade_pending(&mut session).await?;

        if stats.failed + stats.skipped > 0 {
            let writer = WarnWriter::with_path(&self.config.output_log_file);
            for student in session
                .students
                .iter()
                .filter(|s| s.status == GradeStatus::Error)
            {
                writer.write(student)?;
            }
            info!("失败记录已写入: {}", self.config.output_log_file);
        }

        logging::print_results_table(&session.students);

        let csv = csv_io::export_students(&session.tasks, &session.students);
        fs::write(output, csv)
            .await
            .with_context(|| format!("无法写入结果文件: {}", output.display()))?;
        info!("💾 结果已导出至: {}", output.display());

        if analyze {
            self.print_analysis(&session).await?;
        }

        Ok(())
    }

    /// 生成等级描述
    ///
    /// 指定 `focus` 时按评分重点选择维度，会话中没有该维度则新增一个
    async fn generate_levels(
        &self,
        session_path: &Path,
        criterion: usize,
        focus: Option<String>,
        write: bool,
    ) -> Result<()> {
        let mut session = load_session(session_path).await?;
        let index = match focus {
            Some(focus) => match session.criteria.iter().position(|c| c.focus == focus) {
                Some(index) => index,
                None => {
                    info!("➕ 会话中没有评分维度「{}」，新增该维度", focus);
                    session.add_criterion(focus);
                    session.criteria.len() - 1
                }
            },
            None => criterion
                .checked_sub(1)
                .filter(|i| *i < session.criteria.len())
                .with_context(|| {
                    format!(
                        "评分维度序号 {} 超出范围 (共 {} 个)",
                        criterion,
                        session.criteria.len()
                    )
                })?,
        };

        let focus = session.criteria[index].focus.clone();
        info!("🤖 正在为评分维度「{}」生成等级描述...", focus);

        let descriptions = self.llm.generate_levels(&focus, &session.tasks).await?;
        session.criteria[index].apply_descriptions(&descriptions);

        for level in &session.criteria[index].levels {
            println!("{}（{} 分）：{}", level.label, level.score, level.description);
        }

        if write {
            save_session(&session, session_path).await?;
            info!("💾 已写回会话文件: {}", session_path.display());
        }

        Ok(())
    }

    /// 显示分数段
    async fn show_thresholds(&self, session_path: &Path) -> Result<()> {
        let session = load_session(session_path).await?;
        let bands = thresholds::compute_bands(&session.criteria)?;
        logging::print_bands(&bands, thresholds::max_total(&session.criteria)?);
        Ok(())
    }

    /// 根据导出的结果进行班级分析
    async fn analyze(&self, session_path: &Path, results: &Path) -> Result<()> {
        let mut session = load_session(session_path).await?;
        session.students = read_students_csv(results, session.tasks.len()).await?;
        self.print_analysis(&session).await
    }

    async fn print_analysis(&self, session: &GradingSession) -> Result<()> {
        let labels: Vec<String> = thresholds::compute_bands(&session.criteria)
            .map(|bands| bands.into_iter().map(|b| b.label).collect())
            .unwrap_or_default();
        let summary = summarize(&session.students, &labels);
        logging::print_summary(&summary);

        if summary.graded == 0 {
            warn!("⚠️ 没有已评分的学生，跳过班级分析");
            return Ok(());
        }

        info!("🤖 正在进行班级分析...");
        let report = self
            .llm
            .analyze_class(&session.tasks, &summary, &session.students)
            .await?;
        println!("\n{}\n{}", "=".repeat(60), report);
        Ok(())
    }

    /// 模板管理
    async fn template(&self, action: TemplateAction) -> Result<()> {
        let mut store = TemplateStore::load(&self.config.template_store_path)?;

        match action {
            TemplateAction::List => {
                if store.list().is_empty() {
                    println!("暂无模板");
                }
                for t in store.list() {
                    println!(
                        "{}  {}  {}  ({} 个任务, {} 个评分维度)",
                        t.id,
                        t.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                        t.name,
                        t.tasks.len(),
                        t.criteria.len()
                    );
                }
            }
            TemplateAction::Save { name, session } => {
                let session = load_session(&session).await?;
                let template = store.save(name, session.tasks, session.criteria)?;
                println!("已保存模板: {} ({})", template.name, template.id);
            }
            TemplateAction::Show { id } => {
                let template = store
                    .get(&id)
                    .with_context(|| format!("模板不存在: {}", id))?;
                println!("{}", serde_json::to_string_pretty(template)?);
            }
            TemplateAction::Rename { id, name } => {
                store.rename(&id, name)?;
            }
            TemplateAction::Delete { id } => {
                let removed = store.delete(&id)?;
                println!("已删除模板: {}", removed.name);
            }
            TemplateAction::Apply { id, session } => {
                let template = store
                    .get(&id)
                    .with_context(|| format!("模板不存在: {}", id))?;
                let mut current = if session.exists() {
                    load_session(&session).await?
                } else {
                    GradingSession::new()
                };
                current.apply_template(template);
                save_session(&current, &session).await?;
                println!("已将模板「{}」应用到 {}", template.name, session.display());
            }
            TemplateAction::Export { id, output } => {
                let template = store
                    .get(&id)
                    .with_context(|| format!("模板不存在: {}", id))?;
                let mut exported = GradingSession::new();
                exported.apply_template(template);
                save_session(&exported, &output).await?;
                println!("已将模板「{}」导出至 {}", template.name, output.display());
            }
        }

        Ok(())
    }
}

async fn read_students_csv(path: &Path, task_count: usize) -> Result<Vec<crate::models::Student>> {
    let text = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取CSV文件: {}", path.display()))?;
    Ok(csv_io::import_students(&text, task_count)?)
}
