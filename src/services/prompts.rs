//! 提示词构建与响应解析
//!
//! 三类请求：生成等级描述、评价单个学生、班级学情分析

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::constants::LEVEL_COUNT;
use crate::error::{AppError, AppResult};
use crate::models::rubric::Criterion;
use crate::models::student::{GradeResult, Student};
use crate::services::csv_io::format_score;
use crate::services::statistics::ClassSummary;
use crate::services::thresholds::{self, Band};

pub const LEVELS_SYSTEM_MESSAGE: &str =
    "你是一位经验丰富的教师，擅长为作业编写清晰、可操作的评分量规。只输出 JSON。";

pub const EVALUATION_SYSTEM_MESSAGE: &str =
    "你是一位严谨、公正的阅卷老师，严格依据评分量规给学生作答评分，并给出具体、有建设性的评语。只输出 JSON。";

pub const ANALYSIS_SYSTEM_MESSAGE: &str =
    "你是一位教学研究专家，擅长根据班级成绩数据分析学情并提出教学建议。";

/// 生成等级描述的提示词
pub fn build_levels_prompt(focus: &str, tasks: &[String]) -> String {
    format!(
        r#"请为下面的作业任务编写一个评分维度的五个等级描述。

【作业任务】
{}

【评价重点】
{}

【要求】
1. 五个等级从高到低依次为：优秀、良好、中等、及格、不及格
2. 每个描述一到两句话，说明该等级学生作答的具体表现
3. 描述之间要有明显的梯度

只返回一个包含五个字符串的 JSON 数组，例如：["...", "...", "...", "...", "..."]"#,
        format_tasks(tasks),
        focus
    )
}

/// 评价单个学生的提示词
pub fn build_evaluation_prompt(student: &Student, tasks: &[String], criteria: &[Criterion]) -> String {
    let bands = thresholds::compute_bands(criteria).ok();
    let max_total = bands
        .as_deref()
        .and_then(|b| b.first())
        .map(|top| top.ceiling)
        .unwrap_or_default();

    format!(
        r#"请根据评分量规，对学生的作答进行评分。

【作业任务】
{}

【评分量规】（满分 {}）
{}
【等级分数段】
{}

【学生作答】
{}

【要求】
1. 逐个维度对照等级描述，给出总分（0 到 {} 之间）
2. 根据总分所在分数段确定等级
3. 评语要指出优点和需要改进的地方，语气亲切

只返回 JSON，格式为：{{"score": 总分数字, "levelLabel": "等级名称", "feedback": "评语"}}"#,
        format_tasks(tasks),
        max_total,
        format_rubric(criteria),
        bands
            .as_deref()
            .map(format_bands)
            .unwrap_or_else(|| "（未设置）".to_string()),
        format_answers(student, tasks),
        max_total
    )
}

/// 班级分析的提示词
pub fn build_analysis_prompt(tasks: &[String], summary: &ClassSummary, students: &[Student]) -> String {
    let mut details = String::new();
    for student in students.iter().filter(|s| s.has_result()) {
        details.push_str(&format!(
            "- {}：{} 分，{}。评语：{}\n",
            student.name,
            student.score.map(format_score).unwrap_or_default(),
            student.level,
            student.feedback
        ));
    }

    let distribution = summary
        .distribution
        .iter()
        .map(|(label, count)| format!("{} {} 人", label, count))
        .collect::<Vec<_>>()
        .join("，");

    format!(
        r#"以下是一次作业的班级评分结果，请进行学情分析。

【作业任务】
{}

【总体数据】
- 已评分人数：{} / {}
- 平均分：{}
- 最高分：{}
- 最低分：{}
- 等级分布：{}

【每位学生的结果】
{}
【要求】
请从整体表现、共性问题、典型亮点和后续教学建议四个方面进行分析，条理清晰。"#,
        format_tasks(tasks),
        summary.graded,
        summary.total_students,
        summary
            .average
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string()),
        summary.highest.map(format_score).unwrap_or_else(|| "-".to_string()),
        summary.lowest.map(format_score).unwrap_or_else(|| "-".to_string()),
        distribution,
        details
    )
}

// ========== 响应解析 ==========

/// 解析等级描述：恰好五个字符串
pub fn parse_levels_response(response: &str) -> AppResult<Vec<String>> {
    let json = extract_json(response);
    let levels: Vec<String> = serde_json::from_str(json)
        .map_err(|_| AppError::llm_parse_failed("五个等级描述的 JSON 数组", response))?;

    if levels.len() != LEVEL_COUNT {
        return Err(AppError::llm_parse_failed(
            "五个等级描述的 JSON 数组",
            response,
        ));
    }

    Ok(levels)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvaluation {
    score: ScoreValue,
    #[serde(default, alias = "level")]
    level_label: String,
    #[serde(default)]
    feedback: String,
}

/// 有的模型会把分数写成字符串
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreValue {
    Number(f64),
    Text(String),
}

/// 解析评分结果
pub fn parse_evaluation_response(response: &str) -> AppResult<GradeResult> {
    let json = extract_json(response);
    let raw: RawEvaluation = serde_json::from_str(json)
        .map_err(|_| AppError::llm_parse_failed("评分结果 JSON", response))?;

    let score = match raw.score {
        ScoreValue::Number(n) => n,
        ScoreValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::llm_parse_failed("数字分数", response))?,
    };
    if !score.is_finite() {
        return Err(AppError::llm_parse_failed("数字分数", response));
    }

    debug!("解析评分结果: {} / {}", score, raw.level_label);

    Ok(GradeResult {
        score,
        level_label: raw.level_label.trim().to_string(),
        feedback: raw.feedback.trim().to_string(),
    })
}

/// 从响应中取出 JSON 部分（去掉 ```json 代码块包裹和前后说明文字）
pub fn extract_json(response: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid fence regex")
    });

    if let Some(inner) = fence.captures(response).and_then(|c| c.get(1)) {
        return inner.as_str();
    }

    let trimmed = response.trim();
    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    match (start, end) {
        (Some(s), Some(e)) if s < e => &trimmed[s..=e],
        _ => trimmed,
    }
}

// ========== 格式化辅助函数 ==========

fn format_tasks(tasks: &[String]) -> String {
    if tasks.is_empty() {
        return "（无）".to_string();
    }
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| format!("任务{}：{}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_rubric(criteria: &[Criterion]) -> String {
    let mut out = String::new();
    for (i, criterion) in criteria.iter().enumerate() {
        out.push_str(&format!("维度{}：{}\n", i + 1, criterion.focus));
        for level in &criterion.levels {
            out.push_str(&format!(
                "  - {}（{} 分）：{}\n",
                level.label, level.score, level.description
            ));
        }
    }
    out
}

fn format_bands(bands: &[Band]) -> String {
    bands
        .iter()
        .map(|b| format!("{}：{}-{} 分", b.label, b.floor, b.ceiling))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_answers(student: &Student, tasks: &[String]) -> String {
    (0..tasks.len().max(student.answers.len()))
        .map(|i| {
            let answer = student.answers.get(i).map(String::as_str).unwrap_or("");
            let answer = if answer.trim().is_empty() { "（未作答）" } else { answer };
            format!("任务{}作答：{}", i + 1, answer)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_fence() {
        let response = "好的，结果如下：\n```json\n{\"score\": 85}\n```\n希望有帮助";
        assert_eq!(extract_json(response), "{\"score\": 85}");
    }

    #[test]
    fn test_extract_json_from_plain_text() {
        assert_eq!(extract_json("结果: [\"a\", \"b\"] 完毕"), "[\"a\", \"b\"]");
        assert_eq!(extract_json("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_levels_response() {
        let levels =
            parse_levels_response("```json\n[\"很好\", \"好\", \"一般\", \"差\", \"很差\"]\n```")
                .unwrap();
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0], "很好");

        assert!(parse_levels_response("[\"a\", \"b\"]").is_err());
        assert!(parse_levels_response("没有内容").is_err());
    }

    #[test]
    fn test_parse_evaluation_response() {
        let result = parse_evaluation_response(
            r#"{"score": 85, "levelLabel": "良好", "feedback": " 结构清晰 "}"#,
        )
        .unwrap();
        assert_eq!(result.score, 85.0);
        assert_eq!(result.level_label, "良好");
        assert_eq!(result.feedback, "结构清晰");
    }

    #[test]
    fn test_parse_evaluation_string_score() {
        let result =
            parse_evaluation_response(r#"{"score": "72.5", "level": "中等", "feedback": "x"}"#)
                .unwrap();
        assert_eq!(result.score, 72.5);
        assert_eq!(result.level_label, "中等");
    }

    #[test]
    fn test_parse_evaluation_failure() {
        assert!(parse_evaluation_response("我无法评分").is_err());
        assert!(parse_evaluation_response(r#"{"score": "高"}"#).is_err());
    }

    #[test]
    fn test_evaluation_prompt_contents() {
        let tasks = vec!["写一首诗".to_string()];
        let criteria = vec![Criterion::new("意境")];
        let student = Student::new("张三", vec![String::new()]);

        let prompt = build_evaluation_prompt(&student, &tasks, &criteria);
        assert!(prompt.contains("任务1：写一首诗"));
        assert!(prompt.contains("满分 100"));
        assert!(prompt.contains("良好：80-89 分"));
        assert!(prompt.contains("（未作答）"));
    }

    #[test]
    fn test_levels_prompt_contents() {
        let prompt = build_levels_prompt("论证严密", &["议论文".to_string()]);
        assert!(prompt.contains("论证严密"));
        assert!(prompt.contains("任务1：议论文"));
    }
}
