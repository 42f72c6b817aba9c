//! 分数段计算 - 业务能力层
//!
//! 根据所有评分维度的等级分数，推导出总分的等级分数段，
//! 并把一个总分归入对应的等级。
//!
//! 规则：
//! - 每个维度中，第 i 级的下限 = 第 i+1 级分数 + 1，最低一级下限为 0
//! - 各维度的下限逐级相加，得到总分的下限向量
//! - 最高一级的上限 = 各维度最高分之和，其余各级上限 = 上一级下限 - 1
//!
//! 等级分数必须严格递减，否则视为无效量规。

use serde::Serialize;

use crate::constants::{DEFAULT_LEVEL_LABELS, LEVEL_COUNT};
use crate::error::{AppResult, RubricError};
use crate::models::rubric::Criterion;

/// 一个等级对应的总分区间（闭区间）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub label: String,
    pub floor: u32,
    pub ceiling: u32,
}

/// 校验评分维度：恰好五个等级且分数严格递减
pub fn validate(criteria: &[Criterion]) -> AppResult<()> {
    if criteria.is_empty() {
        return Err(RubricError::NoCriteria.into());
    }

    for (ci, criterion) in criteria.iter().enumerate() {
        if criterion.levels.len() != LEVEL_COUNT {
            return Err(RubricError::WrongLevelCount {
                criterion: ci + 1,
                expected: LEVEL_COUNT,
                actual: criterion.levels.len(),
            }
            .into());
        }
        for (li, pair) in criterion.levels.windows(2).enumerate() {
            if pair[1].score >= pair[0].score {
                return Err(RubricError::NonMonotonicLevels {
                    criterion: ci + 1,
                    level: li + 2,
                    score: pair[1].score,
                    previous: pair[0].score,
                }
                .into());
            }
        }
    }

    Ok(())
}

/// 满分（各维度最高等级分数之和）
pub fn max_total(criteria: &[Criterion]) -> AppResult<u32> {
    criteria
        .iter()
        .try_fold(0u32, |total, c| checked_sum(total, c.top_score()))
}

fn checked_sum(total: u32, score: u32) -> AppResult<u32> {
    total
        .checked_add(score)
        .ok_or_else(|| RubricError::ScoreOverflow.into())
}

/// 计算所有等级的总分区间，从高到低排列
pub fn compute_bands(criteria: &[Criterion]) -> AppResult<Vec<Band>> {
    validate(criteria)?;

    let full_marks = max_total(criteria)?;

    // 严格递减保证下一级分数 + 1 不超过本级分数，不会溢出
    let mut floors = [0u32; LEVEL_COUNT];
    for criterion in criteria {
        for (i, floor) in floors.iter_mut().enumerate().take(LEVEL_COUNT - 1) {
            *floor = checked_sum(*floor, criterion.levels[i + 1].score + 1)?;
        }
    }

    let labels = band_labels(criteria);
    let mut bands = Vec::with_capacity(LEVEL_COUNT);
    for i in 0..LEVEL_COUNT {
        let ceiling = if i == 0 {
            full_marks
        } else {
            floors[i - 1] - 1
        };
        bands.push(Band {
            label: labels[i].clone(),
            floor: floors[i],
            ceiling,
        });
    }

    Ok(bands)
}

/// 把总分归入等级
///
/// 高于满分的归入最高等级，低于 0 的归入最低等级
pub fn classify(total: f64, bands: &[Band]) -> Option<&Band> {
    bands
        .iter()
        .find(|band| total >= f64::from(band.floor))
        .or_else(|| bands.last())
}

/// 直接根据评分维度计算总分的等级名称
pub fn level_for_score(total: f64, criteria: &[Criterion]) -> AppResult<String> {
    let bands = compute_bands(criteria)?;
    Ok(classify(total, &bands)
        .map(|band| band.label.clone())
        .unwrap_or_default())
}

/// 等级名称取自第一个维度
fn band_labels(criteria: &[Criterion]) -> Vec<String> {
    match criteria.first() {
        Some(c) => c.levels.iter().map(|l| l.label.clone()).collect(),
        None => DEFAULT_LEVEL_LABELS.iter().map(|s| s.to_string()).collect(),
    }
}
