//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量评分和命令调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 持有配置和 LLM 服务
//! - 分发命令行子命令
//! - 加载会话、导入导出 CSV、管理模板
//!
//! ### `batch_grader` - 批量评分器
//! - 顺序遍历待评分的学生（Vec<Student>）
//! - 控制请求间隔
//! - 更新每个学生的评分状态
//! - 输出统计信息
//!
//! ## 层次关系
//!
//! ```text
//! app (处理命令)
//!     ↓
//! batch_grader (处理 Vec<Student>)
//!     ↓
//! services (能力层：llm / thresholds / csv / templates)
//!     ↓
//! models (数据：rubric / student / session / template)
//! ```

pub mod app;
pub mod batch_grader;

// 重新导出主要类型
pub use app::App;
pub use batch_grader::{BatchGrader, BatchStats};
