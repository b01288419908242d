//! 会话上下文与结果投影

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::TaskVerdict;
use crate::core::{SessionError, SessionPhase, SessionStatus};
use crate::memory::{Conversation, Message};
use crate::spec::Specification;
use crate::trajectory::{State, Trajectory};

/// 外层循环的可变状态，由 ConversationManager 独占
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub conversation: Conversation,
    pub status: SessionStatus,
    pub phase: SessionPhase,
    /// 下一段求解的起点，等于已接受轨迹的最后一个状态
    pub initial_state: State,
    /// 已接受轨迹的拼接结果，首个样本为 x0
    pub trajectory: Trajectory,
    pub specification: Option<Specification>,
    /// 语法修复得到、尚未求解的规格；存在时跳过对话轮直接求解
    pub pending_repair: Option<Specification>,
    /// 裁判刚拒绝，下一轮直接请 LLM 给出新规格
    pub processing_feedback: bool,
}

impl SessionContext {
    pub fn new(x0: State) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            conversation: Conversation::new(),
            status: SessionStatus::Active,
            phase: SessionPhase::GatheringInput,
            initial_state: x0,
            trajectory: Trajectory::starting_at(x0),
            specification: None,
            pending_repair: None,
            processing_feedback: false,
        }
    }

    /// 除 x0 外至少拼接过一段
    pub fn has_accepted_legs(&self) -> bool {
        self.trajectory.len() > 1
    }
}

/// 会话结束后返回给调用方的全部信息
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scenario: String,
    pub status: SessionStatus,
    pub messages: Vec<Message>,
    pub trajectory: Trajectory,
    pub specification: Option<Specification>,
    /// 整条轨迹的确定性验收；场景缺少规则引用的区域时为 None
    pub verdict: Option<TaskVerdict>,
    pub error: Option<SessionError>,
    pub syntax_attempts: u32,
    pub semantic_attempts: u32,
}

impl SessionResult {
    pub fn task_accomplished(&self) -> bool {
        self.verdict
            .as_ref()
            .map(TaskVerdict::is_accomplished)
            .unwrap_or(false)
    }

    pub fn is_aborted(&self) -> bool {
        self.status == SessionStatus::Aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_starts_at_x0() {
        let x0 = State::at_rest([1., 2., 3.]);
        let ctx = SessionContext::new(x0);
        assert_eq!(ctx.status, SessionStatus::Active);
        assert_eq!(ctx.trajectory.states(), &[x0]);
        assert_eq!(ctx.initial_state, x0);
        assert!(!ctx.has_accepted_legs());
        assert!(ctx.conversation.is_empty());
    }
}
