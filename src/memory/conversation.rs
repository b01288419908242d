//! 对话历史：只追加、不剪枝
//!
//! 每轮都会把完整历史原样重放给 LLM，因此消息顺序有语义，历史在整个会话期间只增不改。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 会话历史：按时间顺序追加的消息序列
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// 最后一条 assistant 回复（规格抽取的输入）
    pub fn last_assistant(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// 去掉开头的 system 前言与最后一条消息后的中间段，供语义裁判复用上下文
    pub fn without_preamble_and_last(&self) -> &[Message] {
        if self.messages.len() < 2 {
            return &[];
        }
        &self.messages[1..self.messages.len() - 1]
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_assistant_skips_trailing_system() {
        let mut conv = Conversation::new();
        conv.push(Message::system("instructions"));
        conv.push(Message::user("go"));
        conv.push(Message::assistant("first <a>"));
        conv.push(Message::system("Please provide the specification now."));
        assert_eq!(conv.last_assistant(), Some("first <a>"));
    }

    #[test]
    fn test_without_preamble_and_last() {
        let mut conv = Conversation::new();
        conv.push(Message::system("instructions"));
        conv.push(Message::user("reach the goal"));
        conv.push(Message::assistant("<spec>"));
        let middle = conv.without_preamble_and_last();
        assert_eq!(middle, &[Message::user("reach the goal")]);
    }

    #[test]
    fn test_without_preamble_and_last_short_history() {
        let mut conv = Conversation::new();
        assert!(conv.without_preamble_and_last().is_empty());
        conv.push(Message::system("only"));
        assert!(conv.without_preamble_and_last().is_empty());
    }
}
