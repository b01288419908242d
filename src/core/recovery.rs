//! 错误恢复引擎
//!
//! 根据 SessionError 类型返回 RecoveryAction，供外层循环决定是修复语法、回灌拒绝理由还是终止。

use crate::core::{RecoveryAction, SessionError};

/// 语义化错误恢复：将错误映射为可执行动作
#[derive(Debug, Default)]
pub struct RecoveryEngine;

impl RecoveryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 只有不可行与合规拒绝可在本地恢复；是否还有预算由各修复环自行判断
    pub fn handle(&self, err: &SessionError) -> RecoveryAction {
        match err {
            SessionError::SolverInfeasible(_) => RecoveryAction::RepairSyntax,
            SessionError::ComplianceRejected(reply) => {
                RecoveryAction::FeedBackRejection(format!("Specification checker: {reply}"))
            }
            _ => RecoveryAction::Abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_infeasible() {
        let engine = RecoveryEngine::new();
        let err = SessionError::SolverInfeasible("Solver failed".to_string());
        assert_eq!(engine.handle(&err), RecoveryAction::RepairSyntax);
    }

    #[test]
    fn test_recovery_rejected() {
        let engine = RecoveryEngine::new();
        let err = SessionError::ComplianceRejected("the goal is never reached <rejected>".to_string());
        match engine.handle(&err) {
            RecoveryAction::FeedBackRejection(msg) => {
                assert!(msg.starts_with("Specification checker: "));
                assert!(msg.contains("never reached"));
            }
            other => panic!("Expected FeedBackRejection, got {other:?}"),
        }
    }

    #[test]
    fn test_recovery_fatal_errors_abort() {
        let engine = RecoveryEngine::new();
        for err in [
            SessionError::Extraction("no delimiters".to_string()),
            SessionError::Configuration("missing region 'goal'".to_string()),
            SessionError::SyntaxBudgetExhausted { attempts: 5 },
            SessionError::Llm("rate limited".to_string()),
        ] {
            assert_eq!(engine.handle(&err), RecoveryAction::Abort);
        }
    }
}
