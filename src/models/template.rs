use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rubric::Criterion;

/// 保存的模板：任务 + 评分维度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<String>,
    pub criteria: Vec<Criterion>,
}

impl Template {
    pub fn new(name: impl Into<String>, tasks: Vec<String>, criteria: Vec<Criterion>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            tasks,
            criteria,
        }
    }
}
