//! 评分会话
//!
//! 持有当前正在编辑的任务、评分维度和学生列表，
//! 所有的数据录入操作都通过这里完成

use serde::{Deserialize, Serialize};

use super::rubric::{Criterion, Level};
use super::student::{GradeStatus, Student};
use super::template::Template;
use crate::error::{AppError, AppResult};

/// 评分会话
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingSession {
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl GradingSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 任务 ==========

    pub fn add_task(&mut self, task: impl Into<String>) {
        self.tasks.push(task.into());
    }

    pub fn update_task(&mut self, index: usize, task: impl Into<String>) -> AppResult<()> {
        let len = self.tasks.len();
        let slot = self
            .tasks
            .get_mut(index)
            .ok_or_else(|| AppError::out_of_range("任务", index, len))?;
        *slot = task.into();
        Ok(())
    }

    /// 删除任务，同时删除每个学生对应的答案
    pub fn remove_task(&mut self, index: usize) -> AppResult<String> {
        if index >= self.tasks.len() {
            return Err(AppError::out_of_range("任务", index, self.tasks.len()));
        }
        for student in &mut self.students {
            if index < student.answers.len() {
                student.answers.remove(index);
            }
        }
        Ok(self.tasks.remove(index))
    }

    // ========== 评分维度 ==========

    /// 添加评分维度（默认五个等级）
    pub fn add_criterion(&mut self, focus: impl Into<String>) -> &mut Criterion {
        self.criteria.push(Criterion::new(focus));
        let last = self.criteria.len() - 1;
        &mut self.criteria[last]
    }

    pub fn remove_criterion(&mut self, index: usize) -> AppResult<Criterion> {
        if index >= self.criteria.len() {
            return Err(AppError::out_of_range("评分维度", index, self.criteria.len()));
        }
        Ok(self.criteria.remove(index))
    }

    pub fn set_level(&mut self, criterion: usize, level: usize, value: Level) -> AppResult<()> {
        let len = self.criteria.len();
        let c = self
            .criteria
            .get_mut(criterion)
            .ok_or_else(|| AppError::out_of_range("评分维度", criterion, len))?;
        let level_len = c.levels.len();
        let slot = c
            .levels
            .get_mut(level)
            .ok_or_else(|| AppError::out_of_range("等级", level, level_len))?;
        *slot = value;
        Ok(())
    }

    // ========== 学生 ==========

    /// 添加学生，答案数量补齐到任务数量
    pub fn add_student(&mut self, name: impl Into<String>, mut answers: Vec<String>) -> &Student {
        if answers.len() < self.tasks.len() {
            answers.resize(self.tasks.len(), String::new());
        }
        self.students.push(Student::new(name, answers));
        let last = self.students.len() - 1;
        &self.students[last]
    }

    pub fn remove_student(&mut self, id: &str) -> Option<Student> {
        let pos = self.students.iter().position(|s| s.id == id)?;
        Some(self.students.remove(pos))
    }

    pub fn student_mut(&mut self, id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == id)
    }

    /// 设置某个学生某个任务的答案
    pub fn set_answer(&mut self, id: &str, task: usize, answer: impl Into<String>) -> AppResult<()> {
        let task_count = self.tasks.len();
        if task >= task_count {
            return Err(AppError::out_of_range("任务", task, task_count));
        }
        let student = self
            .student_mut(id)
            .ok_or_else(|| AppError::StudentNotFound(id.to_string()))?;
        if student.answers.len() <= task {
            student.answers.resize(task + 1, String::new());
        }
        student.answers[task] = answer.into();
        Ok(())
    }

    /// 追加导入的学生
    pub fn extend_students(&mut self, students: impl IntoIterator<Item = Student>) {
        self.students.extend(students);
    }

    /// 清空所有评分结果
    pub fn reset_results(&mut self) {
        for student in &mut self.students {
            student.reset();
        }
    }

    /// 还没有评分结果的学生数量
    pub fn pending_count(&self) -> usize {
        self.students
            .iter()
            .filter(|s| s.status != GradeStatus::Done)
            .count()
    }

    // ========== 模板 ==========

    /// 应用模板：替换任务和评分维度，学生答案按新任务数量对齐
    pub fn apply_template(&mut self, template: &Template) {
        self.tasks = template.tasks.clone();
        self.criteria = template.criteria.clone();
        let task_count = self.tasks.len();
        for student in &mut self.students {
            student.answers.resize(task_count, String::new());
        }
    }

    pub fn to_template(&self, name: impl Into<String>) -> Template {
        Template::new(name, self.tasks.clone(), self.criteria.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> GradingSession {
        let mut s = GradingSession::new();
        s.add_task("任务一");
        s.add_task("任务二");
        s.add_criterion("内容");
        s.add_student("张三", vec!["a1".into(), "a2".into()]);
        s.add_student("李四", vec!["b1".into()]);
        s
    }

    #[test]
    fn test_add_student_pads_answers() {
        let s = sample_session();
        assert_eq!(s.students[1].answers, vec!["b1".to_string(), String::new()]);
    }

    #[test]
    fn test_remove_task_drops_answer_column() {
        let mut s = sample_session();
        let removed = s.remove_task(0).unwrap();
        assert_eq!(removed, "任务一");
        assert_eq!(s.tasks, vec!["任务二".to_string()]);
        assert_eq!(s.students[0].answers, vec!["a2".to_string()]);
        assert!(s.remove_task(5).is_err());
    }

    #[test]
    fn test_set_answer_and_remove_student() {
        let mut s = sample_session();
        let id = s.students[1].id.clone();
        s.set_answer(&id, 1, "b2").unwrap();
        assert_eq!(s.students[1].answers[1], "b2");
        assert!(s.set_answer(&id, 2, "x").is_err());

        let removed = s.remove_student(&id).unwrap();
        assert_eq!(removed.name, "李四");
        assert_eq!(s.students.len(), 1);
        assert!(s.remove_student(&id).is_none());
    }

    #[test]
    fn test_set_level() {
        let mut s = sample_session();
        s.set_level(0, 1, Level::new("良", 85, "较好")).unwrap();
        assert_eq!(s.criteria[0].levels[1].score, 85);
        assert!(s.set_level(0, 5, Level::new("x", 1, "")).is_err());
        assert!(s.set_level(3, 0, Level::new("x", 1, "")).is_err());
    }

    #[test]
    fn test_template_round_trip() {
        let mut s = sample_session();
        let template = s.to_template("作文");
        assert_eq!(template.name, "作文");

        let mut other = GradingSession::new();
        other.add_student("王五", vec![]);
        other.apply_template(&template);
        assert_eq!(other.tasks.len(), 2);
        assert_eq!(other.criteria.len(), 1);
        assert_eq!(other.students[0].answers.len(), 2);

        s.remove_criterion(0).unwrap();
        assert!(s.criteria.is_empty());
    }

    #[test]
    fn test_pending_and_reset() {
        let mut s = sample_session();
        assert_eq!(s.pending_count(), 2);
        s.students[0].status = GradeStatus::Done;
        s.students[0].score = Some(90.0);
        assert_eq!(s.pending_count(), 1);
        s.reset_results();
        assert_eq!(s.pending_count(), 2);
    }
}
