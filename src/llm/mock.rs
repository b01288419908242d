//! Mock / Scripted LLM 客户端（用于测试，无需 API）
//!
//! - MockLlmClient：把最后一条 User 消息包进 `<...>` 作为规格；遇到轨迹证据则直接 `<accepted>`，便于本地跑通流程。
//! - ScriptedLlmClient：按顺序返回预置回复，并记录每次收到的完整历史，供测试断言。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// 轨迹证据文本的固定前缀（见 analysis::occupancy::render_evidence）
const EVIDENCE_MARKER: &str = "The drone is";

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let Some(last) = messages.last() {
            if last.role == Role::System && last.content.contains(EVIDENCE_MARKER) {
                return Ok("Mock checker: nothing to object. <accepted>".to_string());
            }
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("Echo from Mock: <{}>", last_user))
    }
}

/// 脚本客户端：按顺序弹出回复；回复耗尽时返回错误
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 每次 complete 收到的历史快照
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages.to_vec());
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| "scripted replies exhausted".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_wraps_last_user_message() {
        let reply = MockLlmClient
            .complete(&[Message::system("rules"), Message::user("reach the goal")])
            .await
            .unwrap();
        assert!(reply.ends_with("<reach the goal>"));
    }

    #[tokio::test]
    async fn test_mock_accepts_evidence() {
        let reply = MockLlmClient
            .complete(&[
                Message::user("reach the goal"),
                Message::system("The drone is never inside the goal.\n"),
            ])
            .await
            .unwrap();
        assert!(reply.contains("<accepted>"));
    }

    #[tokio::test]
    async fn test_scripted_records_calls_in_order() {
        let llm = ScriptedLlmClient::new(["one", "two"]);
        assert_eq!(llm.complete(&[Message::user("a")]).await.unwrap(), "one");
        assert_eq!(llm.complete(&[Message::user("b")]).await.unwrap(), "two");
        assert!(llm.complete(&[]).await.is_err());
        let calls = llm.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1], vec![Message::user("b")]);
        assert_eq!(llm.remaining(), 0);
    }
}
