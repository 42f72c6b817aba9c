//! 日志工具模块
//!
//! 提供批量评分过程中日志格式化和输出的辅助函数

use anyhow::Result;
use std::fs;
use std::time::Duration;
use tracing::info;

use crate::models::student::{GradeStatus, Student};
use crate::orchestrator::batch_grader::BatchStats;
use crate::services::csv_io::format_score;
use crate::services::statistics::ClassSummary;
use crate::services::thresholds::Band;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n评分日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(model_name: &str, delay: Duration) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 作业批量评分");
    info!("🤖 模型: {}", model_name);
    info!("⏱️ 请求间隔: {} 毫秒", delay.as_millis());
    info!("{}", "=".repeat(60));
}

/// 记录批量评分开始信息
///
/// # 参数
/// - `total`: 学生总数
/// - `pending`: 待评分人数
/// - `delay`: 请求间隔
pub fn log_batch_start(total: usize, pending: usize, delay: Duration) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量评分: 待评分 {} / 共 {} 名学生", pending, total);
    info!("💡 逐个评分，每次间隔 {} 毫秒", delay.as_millis());
    info!("{}", "=".repeat(60));
}

/// 记录单个学生开始评分
pub fn log_student_start(index: usize, total: usize, name: &str) {
    info!("\n{}", "─".repeat(30));
    info!("📝 正在评分 {}/{}: {}", index, total, name);
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &BatchStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批量评分完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.succeeded, stats.attempted);
    info!("❌ 失败: {}", stats.failed);
    if stats.skipped > 0 {
        info!("⏭️ 未作答跳过: {}", stats.skipped);
    }
    info!("{}", "=".repeat(60));
}

/// 打印评分结果表
pub fn print_results_table(students: &[Student]) {
    println!("{}", "─".repeat(60));
    println!("{:<12}{:>8}  {:<8}{}", "姓名", "得分", "等级", "评语");
    println!("{}", "─".repeat(60));
    for student in students {
        let (score, level, note) = match student.status {
            GradeStatus::Done => (
                student.score.map(format_score).unwrap_or_default(),
                student.level.clone(),
                truncate_text(&student.feedback, 40),
            ),
            GradeStatus::Error => (
                "-".to_string(),
                "-".to_string(),
                format!("❌ {}", student.error.as_deref().unwrap_or("评分失败")),
            ),
            GradeStatus::Idle | GradeStatus::Loading => {
                ("-".to_string(), "-".to_string(), "未评分".to_string())
            }
        };
        println!("{:<12}{:>8}  {:<8}{}", student.name, score, level, note);
    }
    println!("{}", "─".repeat(60));
}

/// 打印等级分数段
pub fn print_bands(bands: &[Band], max_total: u32) {
    println!("满分: {}", max_total);
    for band in bands {
        println!("  {:<8}{:>5} - {:<5}", band.label, band.floor, band.ceiling);
    }
}

/// 打印班级汇总
pub fn print_summary(summary: &ClassSummary) {
    println!("已评分: {}/{}", summary.graded, summary.total_students);
    if let Some(avg) = summary.average {
        println!("平均分: {:.1}", avg);
    }
    if let (Some(high), Some(low)) = (summary.highest, summary.lowest) {
        println!("最高分: {}  最低分: {}", format_score(high), format_score(low));
    }
    for (label, count) in &summary.distribution {
        println!("  {:<8}{} 人", label, count);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() > max_len {
        single_line.chars().take(max_len).collect::<String>() + "..."
    } else {
        single_line
    }
}
