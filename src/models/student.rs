//! 学生及其评分状态

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 评分状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeStatus {
    #[default]
    Idle,
    Loading,
    Done,
    Error,
}

/// LLM 返回的评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub score: f64,
    pub level_label: String,
    pub feedback: String,
}

/// 学生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    /// 每个任务一个答案
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub status: GradeStatus,
    #[serde(default)]
    pub error: Option<String>,
}

impl Student {
    pub fn new(name: impl Into<String>, answers: Vec<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            answers,
            feedback: String::new(),
            score: None,
            level: String::new(),
            status: GradeStatus::Idle,
            error: None,
        }
    }

    /// 是否已有评分结果
    pub fn has_result(&self) -> bool {
        self.status == GradeStatus::Done && self.score.is_some()
    }

    /// 所有答案都为空
    pub fn is_blank(&self) -> bool {
        self.answers.iter().all(|a| a.trim().is_empty())
    }

    pub fn mark_loading(&mut self) {
        self.status = GradeStatus::Loading;
        self.error = None;
    }

    pub fn mark_done(&mut self, result: GradeResult) {
        self.score = Some(result.score);
        self.level = result.level_label;
        self.feedback = result.feedback;
        self.status = GradeStatus::Done;
        self.error = None;
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = GradeStatus::Error;
        self.error = Some(message.into());
    }

    /// 清空评分结果，恢复为待评分
    pub fn reset(&mut self) {
        self.feedback.clear();
        self.score = None;
        self.level.clear();
        self.status = GradeStatus::Idle;
        self.error = None;
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
