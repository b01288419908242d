//! 脚本求解器（用于测试）：按顺序返回预置结果，并记录收到的规格与初始状态

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::solver::{SolveRequest, SolverOutcome, TrajectorySolver};

#[derive(Debug, Default)]
pub struct ScriptedSolver {
    outcomes: Mutex<VecDeque<SolverOutcome>>,
    requests: Mutex<Vec<SolveRequest>>,
}

impl ScriptedSolver {
    pub fn new(outcomes: impl IntoIterator<Item = SolverOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SolveRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 按调用顺序收到的规格文本
    pub fn specs(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.spec).collect()
    }
}

#[async_trait]
impl TrajectorySolver for ScriptedSolver {
    async fn solve(&self, request: &SolveRequest) -> SolverOutcome {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| SolverOutcome::Infeasible("scripted outcomes exhausted".to_string()))
    }
}
