//! 常量定义
//!
//! 评分量规的默认等级、请求间隔、文件名等

/// 每个评分维度的等级数量
pub const LEVEL_COUNT: usize = 5;

/// 默认等级名称（从高到低）
pub const DEFAULT_LEVEL_LABELS: [&str; LEVEL_COUNT] = ["优秀", "良好", "中等", "及格", "不及格"];

/// 默认等级分数（从高到低）
pub const DEFAULT_LEVEL_SCORES: [u32; LEVEL_COUNT] = [100, 89, 79, 69, 59];

/// 两次 LLM 评分请求之间的默认间隔（毫秒）
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// 模板存储文件
pub const TEMPLATE_STORE_FILE: &str = "templates.json";

/// CSV 导出时添加的 UTF-8 BOM
pub const CSV_BOM: char = '\u{feff}';

/// 导出 CSV 的固定表头
pub const CSV_NAME_HEADER: &str = "姓名";
pub const CSV_SCORE_HEADER: &str = "得分";
pub const CSV_LEVEL_HEADER: &str = "等级";
pub const CSV_FEEDBACK_HEADER: &str = "评语";
