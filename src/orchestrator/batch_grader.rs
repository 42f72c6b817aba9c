//! 批量评分器 - 编排层
//!
//! ## 职责
//!
//! 遍历所有还没有评分结果的学生，逐个调用模型评分。
//!
//! ## 设计特点
//!
//! - **顺序执行**：同一时刻最多只有一个评分请求
//! - **固定间隔**：两次请求之间等待固定时长，不做重试和退避
//! - **失败隔离**：单个学生失败只标记该学生，继续处理下一个
//! - **等级校准**：模型返回分数后按分数段重新确定等级

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::rubric::Criterion;
use crate::models::session::GradingSession;
use crate::models::student::{GradeResult, GradeStatus, Student};
use crate::services::thresholds::{self, Band};
use crate::services::GradingModel;
use crate::utils::logging;

/// 批量评分统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    /// 实际发起请求的人数
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 未作答而跳过的人数
    pub skipped: usize,
}

/// 批量评分器
pub struct BatchGrader<'a, M> {
    model: &'a M,
    delay: Duration,
}

impl<'a, M: GradingModel> BatchGrader<'a, M> {
    pub fn new(model: &'a M, delay: Duration) -> Self {
        Self { model, delay }
    }

    /// 为所有还没有结果的学生评分
    ///
    /// 量规无效时直接返回错误，不发起任何请求
    pub async fn grade_pending(&self, session: &mut GradingSession) -> AppResult<BatchStats> {
        let bands = thresholds::compute_bands(&session.criteria)?;
        let GradingSession {
            tasks,
            criteria,
            students,
        } = session;

        let pending: Vec<usize> = students
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status != GradeStatus::Done)
            .map(|(i, _)| i)
            .collect();

        logging::log_batch_start(students.len(), pending.len(), self.delay);

        let mut stats = BatchStats::default();
        let mut called = false;

        for (n, &index) in pending.iter().enumerate() {
            let student = &mut students[index];
            logging::log_student_start(n + 1, pending.len(), &student.name);

            if student.is_blank() {
                warn!("⚠️ {} 没有作答内容，跳过", student.name);
                student.mark_error("没有作答内容");
                stats.skipped += 1;
                continue;
            }

            if called && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            called = true;
            stats.attempted += 1;

            if self
                .grade_student(student, tasks.as_slice(), criteria.as_slice(), &bands)
                .await
            {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }
        }

        logging::print_final_stats(&stats);

        Ok(stats)
    }

    /// 重新评分单个学生（无论当前状态）
    pub async fn grade_one(&self, session: &mut GradingSession, id: &str) -> AppResult<GradeStatus> {
        let bands = thresholds::compute_bands(&session.criteria)?;
        let GradingSession {
            tasks,
            criteria,
            students,
        } = session;

        let student = students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::StudentNotFound(id.to_string()))?;

        student.reset();
        self.grade_student(student, tasks.as_slice(), criteria.as_slice(), &bands)
            .await;
        Ok(student.status)
    }

    /// 评分单个学生，失败时只标记该学生
    async fn grade_student(
        &self,
        student: &mut Student,
        tasks: &[String],
        criteria: &[Criterion],
        bands: &[Band],
    ) -> bool {
        student.mark_loading();

        match self.model.evaluate_student(student, tasks, criteria).await {
            Ok(result) => {
                let result = calibrate_level(result, bands);
                info!(
                    "✓ {}: {} 分 ({})",
                    student.name,
                    crate::services::csv_io::format_score(result.score),
                    result.level_label
                );
                student.mark_done(result);
                true
            }
            Err(e) => {
                warn!("⚠️ {} 评分失败: {}", student.name, e);
                student.mark_error(e.to_string());
                false
            }
        }
    }
}

/// 按分数段确定等级，与模型给出的等级不一致时以分数段为准
fn calibrate_level(mut result: GradeResult, bands: &[Band]) -> GradeResult {
    if let Some(band) = thresholds::classify(result.score, bands) {
        if band.label != result.level_label {
            debug!(
                "模型等级 '{}' 与分数段等级 '{}' 不一致 (分数 {})",
                result.level_label, band.label, result.score
            );
            result.level_label = band.label.clone();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::statistics::ClassSummary;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 按调用顺序返回固定结果的模型
    struct ScriptedModel {
        calls: AtomicUsize,
        scores: Vec<Option<f64>>,
    }

    impl GradingModel for ScriptedModel {
        async fn generate_levels(&self, _focus: &str, _tasks: &[String]) -> AppResult<Vec<String>> {
            Ok(vec![String::new(); 5])
        }

        async fn evaluate_student(
            &self,
            _student: &Student,
            _tasks: &[String],
            _criteria: &[Criterion],
        ) -> AppResult<GradeResult> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.scores.get(n).copied().flatten() {
                Some(score) => Ok(GradeResult {
                    score,
                    level_label: "模型等级".to_string(),
                    feedback: format!("第{}次", n + 1),
                }),
                None => Err(AppError::llm_api_failed("scripted", "rate limited")),
            }
        }

        async fn analyze_class(
            &self,
            _tasks: &[String],
            _summary: &ClassSummary,
            _students: &[Student],
        ) -> AppResult<String> {
            Ok(String::new())
        }
    }

    fn session() -> GradingSession {
        let mut s = GradingSession::new();
        s.add_task("任务");
        s.add_criterion("内容");
        s.add_student("甲", vec!["答".into()]);
        s.add_student("乙", vec!["答".into()]);
        s.add_student("丙", vec!["答".into()]);
        s
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let model = ScriptedModel {
            calls: AtomicUsize::new(0),
            scores: vec![Some(95.0), None, Some(85.0)],
        };
        let mut s = session();

        let stats = BatchGrader::new(&model, Duration::ZERO)
            .grade_pending(&mut s)
            .await
            .unwrap();

        assert_eq!(
            stats,
            BatchStats {
                attempted: 3,
                succeeded: 2,
                failed: 1,
                skipped: 0
            }
        );
        assert_eq!(s.students[0].level, "优秀");
        assert_eq!(s.students[1].status, GradeStatus::Error);
        assert!(s.students[1].error.as_deref().unwrap().contains("rate limited"));
        assert_eq!(s.students[2].score, Some(85.0));
        assert_eq!(s.students[2].level, "良好");
    }

    #[tokio::test]
    async fn test_done_students_are_not_regraded() {
        let model = ScriptedModel {
            calls: AtomicUsize::new(0),
            scores: vec![Some(70.0)],
        };
        let mut s = session();
        s.students[0].mark_done(GradeResult {
            score: 90.0,
            level_label: "优秀".into(),
            feedback: String::new(),
        });
        s.students[2].answers = vec!["  ".into()];

        let stats = BatchGrader::new(&model, Duration::ZERO)
            .grade_pending(&mut s)
            .await
            .unwrap();

        assert_eq!(stats.attempted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(s.students[0].score, Some(90.0));
        assert_eq!(s.students[1].level, "中等");
        assert_eq!(s.students[2].status, GradeStatus::Error);
    }

    #[tokio::test]
    async fn test_invalid_rubric_makes_no_calls() {
        let model = ScriptedModel {
            calls: AtomicUsize::new(0),
            scores: vec![],
        };
        let mut s = session();
        s.criteria[0].levels[1].score = 100;

        assert!(BatchGrader::new(&model, Duration::ZERO)
            .grade_pending(&mut s)
            .await
            .is_err());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_grade_one() {
        let model = ScriptedModel {
            calls: AtomicUsize::new(0),
            scores: vec![Some(61.0)],
        };
        let mut s = session();
        let id = s.students[1].id.clone();

        let status = BatchGrader::new(&model, Duration::ZERO)
            .grade_one(&mut s, &id)
            .await
            .unwrap();
        assert_eq!(status, GradeStatus::Done);
        assert_eq!(s.students[1].level, "及格");
        assert_eq!(s.students[0].status, GradeStatus::Idle);

        assert!(BatchGrader::new(&model, Duration::ZERO)
            .grade_one(&mut s, "missing")
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_between_calls() {
        let model = ScriptedModel {
            calls: AtomicUsize::new(0),
            scores: vec![Some(90.0), Some(90.0), Some(90.0)],
        };
        let mut s = session();

        let start = tokio::time::Instant::now();
        BatchGrader::new(&model, Duration::from_secs(2))
            .grade_pending(&mut s)
            .await
            .unwrap();
        // 三次请求之间两次间隔
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_secs(6));
    }
}
