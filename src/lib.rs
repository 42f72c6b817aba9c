//! # Rubric Grader
//!
//! 一个根据评分量规调用大模型批量批改作业的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 数据层（Models）
//! - `models/` - 纯数据：等级、评分维度、学生、模板、评分会话
//! - `GradingSession` - 所有数据录入操作（增删任务、维度、学生）的入口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个对象
//! - `thresholds` - 由等级分数推导总分分数段
//! - `LlmService` - 生成等级描述、评价学生、班级分析
//! - `csv_io` - 学生作答导入、评分结果导出
//! - `TemplateStore` - 模板的本地 JSON 存储
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_grader` - 顺序批量评分，固定请求间隔
//! - `orchestrator/app` - 命令分发
//!
//! ### ④ 公共设施
//! - `config` / `error` / `logger` / `utils` / `cli`
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Criterion, GradeResult, GradeStatus, GradingSession, Level, Student, Template};
pub use orchestrator::{App, BatchGrader, BatchStats};
pub use services::{GradingModel, LlmService, TemplateStore};
