//! 评分量规：评分维度与等级

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LEVEL_LABELS, DEFAULT_LEVEL_SCORES};

/// 评分维度中的一个等级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// 等级名称（如"优秀"）
    pub label: String,
    /// 该等级对应的分数
    pub score: u32,
    /// 等级描述
    #[serde(default)]
    pub description: String,
}

impl Level {
    pub fn new(label: impl Into<String>, score: u32, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            score,
            description: description.into(),
        }
    }
}

/// 评分维度
///
/// `levels` 按从高到低排列，应恰好有五个等级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// 评价重点
    pub focus: String,
    #[serde(default = "default_levels")]
    pub levels: Vec<Level>,
}

impl Criterion {
    /// 使用默认五个等级创建评分维度
    pub fn new(focus: impl Into<String>) -> Self {
        Self {
            focus: focus.into(),
            levels: default_levels(),
        }
    }

    /// 最高等级分数
    pub fn top_score(&self) -> u32 {
        self.levels.first().map(|l| l.score).unwrap_or(0)
    }

    /// 用生成的描述填充等级描述，多余的描述会被忽略
    pub fn apply_descriptions<S: AsRef<str>>(&mut self, descriptions: &[S]) {
        for (level, desc) in self.levels.iter_mut().zip(descriptions) {
            level.description = desc.as_ref().to_string();
        }
    }
}

/// 默认的五个等级（描述为空）
pub fn default_levels() -> Vec<Level> {
    DEFAULT_LEVEL_LABELS
        .iter()
        .zip(DEFAULT_LEVEL_SCORES)
        .map(|(label, score)| Level::new(*label, score, ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_criterion_has_default_levels() {
        let c = Criterion::new("论点清晰");
        assert_eq!(c.levels.len(), 5);
        assert_eq!(c.levels[0].label, "优秀");
        assert_eq!(c.levels[4].score, 59);
        assert_eq!(c.top_score(), 100);
    }

    #[test]
    fn test_apply_descriptions() {
        let mut c = Criterion::new("结构");
        c.apply_descriptions(&["a", "b", "c"]);
        assert_eq!(c.levels[0].description, "a");
        assert_eq!(c.levels[2].description, "c");
        assert_eq!(c.levels[3].description, "");
    }
}
