//! 会话层：外层循环、操作员输入、会话构建

pub mod builder;
pub mod context;
pub mod manager;
pub mod operator;

pub use builder::{create_llm_from_config, create_solver_from_config, load_prompts, SessionBuilder};
pub use context::{SessionContext, SessionResult};
pub use manager::{ConversationManager, SessionSettings, FEEDBACK_NUDGE, SPECIFICATION_NUDGE};
pub use operator::{is_quit, OperatorInput, ScriptedOperator, StdinOperator, QUIT_COMMAND};
