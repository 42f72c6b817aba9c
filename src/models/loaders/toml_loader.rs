use crate::models::session::GradingSession;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载评分会话（任务、评分维度、可选的学生列表）
pub async fn load_session(toml_file_path: &Path) -> Result<GradingSession> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let session = parse_session(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "成功加载会话: {} 个任务, {} 个评分维度, {} 名学生",
        session.tasks.len(),
        session.criteria.len(),
        session.students.len()
    );

    Ok(session)
}

/// 解析会话内容，学生答案数量补齐到任务数量
pub fn parse_session(content: &str) -> Result<GradingSession> {
    let mut session: GradingSession = toml::from_str(content)?;

    let task_count = session.tasks.len();
    for student in &mut session.students {
        if student.answers.len() < task_count {
            student.answers.resize(task_count, String::new());
        }
    }

    Ok(session)
}

/// 将整个会话写回 TOML 文件
///
/// 任务、评分维度和学生（包括 id 与评分结果）都会写入
pub async fn save_session(session: &GradingSession, toml_file_path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(session).context("无法序列化会话")?;
    fs::write(toml_file_path, content)
        .await
        .with_context(|| format!("无法写入TOML文件: {}", toml_file_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
tasks = ["写一段关于秋天的描写", "分析课文主旨"]

[[criteria]]
focus = "语言表达"

[[criteria.levels]]
label = "优秀"
score = 50
description = "语言生动"

[[criteria.levels]]
label = "良好"
score = 44

[[criteria.levels]]
label = "中等"
score = 39

[[criteria.levels]]
label = "及格"
score = 34

[[criteria.levels]]
label = "不及格"
score = 29

[[criteria]]
focus = "内容理解"

[[students]]
name = "张三"
answers = ["秋天来了"]
"#;

    #[test]
    fn test_parse_session() {
        let session = parse_session(SAMPLE).unwrap();
        assert_eq!(session.tasks.len(), 2);
        assert_eq!(session.criteria.len(), 2);
        assert_eq!(session.criteria[0].levels[0].description, "语言生动");
        assert_eq!(session.criteria[0].levels[1].description, "");
        // 未写等级的维度使用默认等级
        assert_eq!(session.criteria[1].levels.len(), 5);
        assert_eq!(session.criteria[1].top_score(), 100);

        let student = &session.students[0];
        assert_eq!(student.answers.len(), 2);
        assert!(!student.id.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");

        let session = parse_session(SAMPLE).unwrap();
        save_session(&session, &path).await.unwrap();

        let loaded = load_session(&path).await.unwrap();
        assert_eq!(loaded.tasks, session.tasks);
        assert_eq!(loaded.criteria, session.criteria);
        assert_eq!(loaded.students[0].name, "张三");
        assert_eq!(loaded.students[0].id, session.students[0].id);
    }
}
