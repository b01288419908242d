//! 记忆层：会话历史（只追加）

pub mod conversation;

pub use conversation::{Conversation, Message, Role};
