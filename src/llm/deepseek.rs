//! DeepSeek 后端
//!
//! 走 OpenAI 兼容接口，只替换 base_url 与模型名。`create_llm_from_config` 在
//! provider 为 "deepseek"，或只设置了 `DEEPSEEK_API_KEY` 时选用它；
//! [llm].model 不是 deepseek 系列（默认的 gpt-4o）时改用 deepseek-chat。

use crate::llm::OpenAiClient;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
/// 未指定 deepseek 模型时的默认值
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";

/// 配置里的模型名属于 deepseek 系列则沿用，否则退回 deepseek-chat
pub fn deepseek_model_for(configured: &str) -> &str {
    if configured.starts_with("deepseek") {
        configured
    } else {
        DEEPSEEK_CHAT
    }
}

/// Key 取 `DEEPSEEK_API_KEY`，其次 `OPENAI_API_KEY`；
/// model 为 None 时读 `DEEPSEEK_MODEL`，仍缺省则用 deepseek-chat
pub fn create_deepseek_client(model: Option<&str>) -> OpenAiClient {
    let api_key = std::env::var("DEEPSEEK_API_KEY")
        .ok()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_else(|| "sk-placeholder".to_string());

    let model = model
        .map(String::from)
        .or_else(|| std::env::var("DEEPSEEK_MODEL").ok())
        .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());

    OpenAiClient::new(Some(DEEPSEEK_BASE_URL), &model, Some(api_key.as_str()))
}
