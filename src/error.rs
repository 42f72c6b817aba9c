use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 评分量规错误
    #[error("量规错误: {0}")]
    Rubric(#[from] RubricError),
    /// CSV 导入导出错误
    #[error("CSV错误: {0}")]
    Csv(#[from] CsvError),
    /// 本地存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 学生不存在
    #[error("学生不存在: {0}")]
    StudentNotFound(String),
}

/// 评分量规错误
#[derive(Debug, Error)]
pub enum RubricError {
    /// 没有任何评分维度
    #[error("至少需要一个评分维度")]
    NoCriteria,
    /// 等级数量不正确
    #[error("评分维度 {criterion} 的等级数量为 {actual}，应为 {expected}")]
    WrongLevelCount {
        criterion: usize,
        expected: usize,
        actual: usize,
    },
    /// 等级分数不是严格递减
    #[error("评分维度 {criterion} 的第 {level} 个等级分数 {score} 不低于上一等级 {previous}")]
    NonMonotonicLevels {
        criterion: usize,
        level: usize,
        score: u32,
        previous: u32,
    },
    /// 等级分数之和超出范围
    #[error("等级分数之和超出可表示的范围")]
    ScoreOverflow,
    /// 索引超出范围
    #[error("{what} 索引 {index} 超出范围 (共 {len} 项)")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// CSV 错误
#[derive(Debug, Error)]
pub enum CsvError {
    /// 文件没有任何数据行
    #[error("CSV 文件没有数据行")]
    Empty,
    /// 引号未闭合
    #[error("第 {line} 行存在未闭合的引号")]
    UnterminatedQuote { line: usize },
}

/// 本地存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    Json(#[from] serde_json::Error),
    /// 模板不存在
    #[error("模板不存在: {id}")]
    TemplateNotFound { id: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败: {0}")]
    RequestBuild(String),
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容无法解析
    #[error("无法解析LLM返回内容 ({expected}): {response}")]
    ParseFailed {
        expected: &'static str,
        response: String,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(StorageError::Json(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建LLM API调用错误
    pub fn llm_api_failed(model: impl Into<String>, source: impl std::fmt::Display) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            message: source.to_string(),
        })
    }

    /// 创建LLM响应解析错误
    pub fn llm_parse_failed(expected: &'static str, response: impl Into<String>) -> Self {
        AppError::Llm(LlmError::ParseFailed {
            expected,
            response: response.into(),
        })
    }

    /// 创建索引越界错误
    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        AppError::Rubric(RubricError::IndexOutOfRange { what, index, len })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
