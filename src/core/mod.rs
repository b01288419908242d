//! 核心层：错误与恢复、重试预算、会话状态

pub mod budget;
pub mod error;
pub mod recovery;
pub mod state;

pub use budget::RetryBudget;
pub use error::{RecoveryAction, SessionError};
pub use recovery::RecoveryEngine;
pub use state::{SessionPhase, SessionStatus};
