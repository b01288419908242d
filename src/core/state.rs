//! 会话状态：外层循环阶段与终态

use serde::Serialize;

/// 会话状态。Exited / Completed 由对话轮产生，Aborted 表示致命错误终止
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Active,
    /// 用户输入 quit
    Exited,
    /// 自动模式下首条轨迹被接受（或语义检查关闭时首条轨迹求解成功）
    Completed,
    /// 预算耗尽、抽取失败、配置错误等
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

/// 外层循环阶段（日志与结果投影用）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    GatheringInput,
    ExtractingSpec,
    Solving,
    CheckingCompliance,
    Terminal,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::GatheringInput => "gathering-input",
            SessionPhase::ExtractingSpec => "extracting-spec",
            SessionPhase::Solving => "solving",
            SessionPhase::CheckingCompliance => "checking-compliance",
            SessionPhase::Terminal => "terminal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_keeps_the_loop_running() {
        assert!(!SessionStatus::Active.is_terminal());
        for status in [SessionStatus::Exited, SessionStatus::Completed, SessionStatus::Aborted] {
            assert!(status.is_terminal(), "{status:?} should end the session");
        }
    }
}
