//! LLM 服务 - 业务能力层
//!
//! 只负责"调用模型"能力，不关心批量流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::rubric::Criterion;
use crate::models::student::{GradeResult, Student};
use crate::services::prompts;
use crate::services::statistics::ClassSummary;

/// 评分模型能力
///
/// 批量评分流程只依赖这个 trait，便于替换为测试实现
pub trait GradingModel {
    /// 根据评价重点和任务生成五个等级描述
    fn generate_levels(
        &self,
        focus: &str,
        tasks: &[String],
    ) -> impl Future<Output = AppResult<Vec<String>>> + Send;

    /// 评价单个学生
    fn evaluate_student(
        &self,
        student: &Student,
        tasks: &[String],
        criteria: &[Criterion],
    ) -> impl Future<Output = AppResult<GradeResult>> + Send;

    /// 班级学情分析
    fn analyze_class(
        &self,
        tasks: &[String],
        summary: &ClassSummary,
        students: &[Student],
    ) -> impl Future<Output = AppResult<String>> + Send;
}

/// LLM 服务
///
/// 职责：
/// - 构建提示词并调用 LLM API
/// - 解析结构化响应
/// - 只处理单个请求，不关心学生列表的遍历顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| LlmError::RequestBuild(e.to_string()))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::RequestBuild(e.to_string()))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::RequestBuild(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

impl GradingModel for LlmService {
    async fn generate_levels(&self, focus: &str, tasks: &[String]) -> AppResult<Vec<String>> {
        let prompt = prompts::build_levels_prompt(focus, tasks);
        let response = self
            .send_to_llm(&prompt, Some(prompts::LEVELS_SYSTEM_MESSAGE))
            .await?;
        prompts::parse_levels_response(&response)
    }

    async fn evaluate_student(
        &self,
        student: &Student,
        tasks: &[String],
        criteria: &[Criterion],
    ) -> AppResult<GradeResult> {
        let prompt = prompts::build_evaluation_prompt(student, tasks, criteria);
        let response = self
            .send_to_llm(&prompt, Some(prompts::EVALUATION_SYSTEM_MESSAGE))
            .await?;
        prompts::parse_evaluation_response(&response)
    }

    async fn analyze_class(
        &self,
        tasks: &[String],
        summary: &ClassSummary,
        students: &[Student],
    ) -> AppResult<String> {
        let prompt = prompts::build_analysis_prompt(tasks, summary, students);
        self.send_to_llm(&prompt, Some(prompts::ANALYSIS_SYSTEM_MESSAGE))
            .await
    }
}
