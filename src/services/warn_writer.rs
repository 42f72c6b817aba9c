//! 警告写入服务 - 业务能力层
//!
//! 只负责把评分失败的学生追加到日志文件，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::student::Student;

/// 警告写入服务
///
/// 职责：
/// - 将评分失败的学生写入日志文件
/// - 只处理单个学生的警告
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入评分失败信息
    pub fn write(&self, student: &Student) -> Result<()> {
        let reason = student.error.as_deref().unwrap_or("未知错误");
        debug!("写入警告: 学生 {} | {}", student.name, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;

        let warn_msg = format!(
            "[{}] 学生 {} ({}) | 评分失败: {}\n",
            chrono::Local::now().format("%H:%M:%S"),
            student.name,
            student.id,
            reason
        );

        file.write_all(warn_msg.as_bytes())?;

        Ok(())
    }
}
