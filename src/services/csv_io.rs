//! CSV 导入导出 - 业务能力层
//!
//! 导入：第一列为姓名，之后每列对应一个任务的答案，第一行为表头
//! 导出：姓名、各任务答案、得分、等级、评语，带 UTF-8 BOM

use crate::constants::{
    CSV_BOM, CSV_FEEDBACK_HEADER, CSV_LEVEL_HEADER, CSV_NAME_HEADER, CSV_SCORE_HEADER,
};
use crate::error::{AppResult, CsvError};
use crate::models::student::{GradeResult, Student};

/// 解析 CSV 文本为记录列表，支持引号内的逗号、换行和双引号转义
pub fn parse_records(text: &str) -> AppResult<Vec<Vec<String>>> {
    let text = text.strip_prefix(CSV_BOM).unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut quote_line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: quote_line }.into());
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

/// 导入学生：跳过表头和空行，答案数量补齐到 `task_count`
///
/// 只有表头在答案列之后依次是得分、等级、评语（即本程序导出的文件），
/// 且得分是有限数字时，该学生才直接视为已评分
pub fn import_students(text: &str, task_count: usize) -> AppResult<Vec<Student>> {
    let records = parse_records(text)?;
    if records.len() < 2 {
        return Err(CsvError::Empty.into());
    }

    let with_results = has_result_columns(&records[0], task_count);

    let students = records
        .into_iter()
        .skip(1)
        .filter_map(|record| {
            let mut fields = record.into_iter();
            let name = fields.next()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let mut answers: Vec<String> = fields.by_ref().take(task_count).collect();
            answers.resize(task_count, String::new());
            let mut student = Student::new(name, answers);

            if with_results {
                let score = fields
                    .next()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|score| score.is_finite());
                if let Some(score) = score {
                    student.mark_done(GradeResult {
                        score,
                        level_label: fields.next().unwrap_or_default(),
                        feedback: fields.next().unwrap_or_default(),
                    });
                }
            }
            Some(student)
        })
        .collect();

    Ok(students)
}

/// 表头在答案列之后是否为导出的结果列
fn has_result_columns(header: &[String], task_count: usize) -> bool {
    let expected = [CSV_SCORE_HEADER, CSV_LEVEL_HEADER, CSV_FEEDBACK_HEADER];
    header.len() >= task_count + 1 + expected.len()
        && header[task_count + 1..]
            .iter()
            .zip(expected)
            .all(|(column, name)| column.trim() == name)
}

/// 导出学生和评分结果
pub fn export_students(tasks: &[String], students: &[Student]) -> String {
    let mut out = String::new();
    out.push(CSV_BOM);

    let mut header = vec![CSV_NAME_HEADER.to_string()];
    header.extend((1..=tasks.len()).map(|i| format!("任务{}", i)));
    header.push(CSV_SCORE_HEADER.to_string());
    header.push(CSV_LEVEL_HEADER.to_string());
    header.push(CSV_FEEDBACK_HEADER.to_string());
    push_row(&mut out, header.iter().map(String::as_str));

    for student in students {
        let mut row: Vec<String> = Vec::with_capacity(tasks.len() + 4);
        row.push(student.name.clone());
        for i in 0..tasks.len() {
            row.push(student.answers.get(i).cloned().unwrap_or_default());
        }
        row.push(student.score.map(format_score).unwrap_or_default());
        row.push(student.level.clone());
        row.push(student.feedback.clone());
        push_row(&mut out, row.iter().map(String::as_str));
    }

    out
}

/// 分数显示：整数不带小数点
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{}", score)
    }
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let row: Vec<String> = fields.map(csv_quote).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::GradeStatus;

    #[test]
    fn test_parse_quoted_fields() {
        let text = "a,\"b,c\",\"say \"\"hi\"\"\"\n\"multi\nline\",x,y\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], vec!["a", "b,c", "say \"hi\""]);
        assert_eq!(records[1][0], "multi\nline");
    }

    #[test]
    fn test_parse_crlf_and_no_trailing_newline() {
        let records = parse_records("h1,h2\r\nx,y").unwrap();
        assert_eq!(records, vec![vec!["h1", "h2"], vec!["x", "y"]]);
    }

    #[test]
    fn test_parse_unterminated_quote() {
        assert!(parse_records("a,\"b\nc").is_err());
    }

    #[test]
    fn test_import_skips_header_and_blank_rows() {
        let text = "\u{feff}姓名,任务1,任务2\n张三,答一\n\n,答,答\n  ,\n李四,甲,乙,多余\n";
        let students = import_students(text, 2).unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[1].name, "李四");
        assert_eq!(students[0].name, "张三");
        assert_eq!(students[0].answers, vec!["答一".to_string(), String::new()]);
        assert_eq!(students[1].answers, vec!["甲".to_string(), "乙".to_string()]);
    }

    #[test]
    fn test_import_exported_results() {
        let text = "姓名,任务1,得分,等级,评语\n张三,答,88,良好,不错\n李四,答,,,\n";
        let students = import_students(text, 1).unwrap();
        assert!(students[0].has_result());
        assert_eq!(students[0].score, Some(88.0));
        assert_eq!(students[0].level, "良好");
        assert_eq!(students[0].feedback, "不错");
        assert!(!students[1].has_result());
    }

    #[test]
    fn test_extra_columns_are_not_results() {
        let text = "姓名,任务1,任务2,任务3\n张三,答一,答二,3\n李四,甲,乙,nan\n";
        let students = import_students(text, 2).unwrap();
        for student in &students {
            assert_eq!(student.status, GradeStatus::Idle);
            assert_eq!(student.score, None);
        }
        assert_eq!(students[0].answers, vec!["答一".to_string(), "答二".to_string()]);
    }

    #[test]
    fn test_non_finite_exported_score_is_ignored() {
        let text = "姓名,任务1,得分,等级,评语\n张三,答,nan,良好,不错\n李四,答,inf,,\n";
        let students = import_students(text, 1).unwrap();
        assert!(students.iter().all(|s| s.status == GradeStatus::Idle));
        assert!(students.iter().all(|s| s.score.is_none()));
    }

    #[test]
    fn test_import_header_only() {
        assert!(import_students("姓名,任务1\n", 1).is_err());
    }

    #[test]
    fn test_export_format() {
        let tasks = vec!["t1".to_string()];
        let mut s = Student::new("王\"五\"", vec!["a,b".to_string()]);
        s.score = Some(85.0);
        s.level = "良好".to_string();
        s.feedback = "很好".to_string();

        let csv = export_students(&tasks, &[s]);
        assert!(csv.starts_with('\u{feff}'));
        let mut lines = csv.trim_start_matches('\u{feff}').lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"姓名\",\"任务1\",\"得分\",\"等级\",\"评语\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"王\"\"五\"\"\",\"a,b\",\"85\",\"良好\",\"很好\""
        );
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(85.0), "85");
        assert_eq!(format_score(85.5), "85.5");
    }
}
