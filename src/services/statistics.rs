//! 班级统计

use serde::Serialize;

use crate::models::student::{GradeStatus, Student};

/// 班级成绩汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub total_students: usize,
    pub graded: usize,
    pub average: Option<f64>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
    /// (等级名称, 人数)，按等级顺序排列
    pub distribution: Vec<(String, usize)>,
}

/// 计算班级汇总，只统计已完成评分的学生
///
/// `labels` 决定分布的顺序，不在其中的等级追加在末尾
pub fn summarize(students: &[Student], labels: &[String]) -> ClassSummary {
    let graded: Vec<(&Student, f64)> = students
        .iter()
        .filter(|s| s.status == GradeStatus::Done)
        .filter_map(|s| s.score.map(|score| (s, score)))
        .collect();

    let scores: Vec<f64> = graded.iter().map(|(_, score)| *score).collect();
    let average = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };
    let highest = scores.iter().copied().reduce(f64::max);
    let lowest = scores.iter().copied().reduce(f64::min);

    let mut distribution: Vec<(String, usize)> =
        labels.iter().map(|label| (label.clone(), 0)).collect();
    for (student, _) in &graded {
        match distribution.iter_mut().find(|(label, _)| *label == student.level) {
            Some((_, count)) => *count += 1,
            None => distribution.push((student.level.clone(), 1)),
        }
    }

    ClassSummary {
        total_students: students.len(),
        graded: graded.len(),
        average,
        highest,
        lowest,
        distribution,
    }
}
