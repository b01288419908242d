//! 确定性验收：只看占用矩阵，不调用 LLM
//!
//! - ReachAvoid：goal 行至少一个 1，且所有障碍物行全 0
//! - OrderedAccess：target 行至少一个 1，所有墙体行全 0，且 gate 的首次进入不早于 key 的首次进入
//!   （gate 或 key 从未进入时不构成顺序违规）

use std::fmt;

use serde::Serialize;

use crate::analysis::OccupancyTrace;
use crate::core::SessionError;
use crate::scenario::ScenarioKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    GoalNotReached,
    ObstacleCrossed(String),
    TargetNotReached,
    WallCrossed(String),
    GateBeforeKey { gate_step: usize, key_step: usize },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::GoalNotReached => f.write_str("The goal was not reached."),
            FailureReason::ObstacleCrossed(name) => write!(f, "An obstacle was crossed ({name})."),
            FailureReason::TargetNotReached => f.write_str("The target was not reached."),
            FailureReason::WallCrossed(name) => write!(f, "A wall was crossed ({name})."),
            FailureReason::GateBeforeKey {
                gate_step,
                key_step,
            } => write!(
                f,
                "The gate was crossed at step {gate_step}, before the key was reached at step {key_step}."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TaskVerdict {
    Accomplished,
    Failed(FailureReason),
}

impl TaskVerdict {
    pub fn is_accomplished(&self) -> bool {
        matches!(self, TaskVerdict::Accomplished)
    }
}

/// 规则引用的区域不在占用矩阵中时返回配置错误
pub fn is_task_accomplished(
    trace: &OccupancyTrace,
    kind: &ScenarioKind,
) -> Result<TaskVerdict, SessionError> {
    let verdict = match kind {
        ScenarioKind::ReachAvoid { goal, obstacles } => {
            let goal_reached = trace.ever_inside(goal)?;
            let crossed = first_entered(trace, obstacles)?;
            match (goal_reached, crossed) {
                (false, _) => TaskVerdict::Failed(FailureReason::GoalNotReached),
                (true, Some(name)) => TaskVerdict::Failed(FailureReason::ObstacleCrossed(name)),
                (true, None) => TaskVerdict::Accomplished,
            }
        }
        ScenarioKind::OrderedAccess {
            target,
            walls,
            gate,
            key,
        } => {
            let target_reached = trace.ever_inside(target)?;
            let crossed = first_entered(trace, walls)?;
            let ordering = match (trace.first_entry(gate)?, trace.first_entry(key)?) {
                (Some(gate_step), Some(key_step)) if gate_step < key_step => {
                    Some(FailureReason::GateBeforeKey {
                        gate_step,
                        key_step,
                    })
                }
                _ => None,
            };
            if !target_reached {
                TaskVerdict::Failed(FailureReason::TargetNotReached)
            } else if let Some(name) = crossed {
                TaskVerdict::Failed(FailureReason::WallCrossed(name))
            } else if let Some(reason) = ordering {
                TaskVerdict::Failed(reason)
            } else {
                TaskVerdict::Accomplished
            }
        }
    };
    Ok(verdict)
}

/// 第一个被进入过的区域名
fn first_entered(trace: &OccupancyTrace, regions: &[String]) -> Result<Option<String>, SessionError> {
    for name in regions {
        if trace.ever_inside(name)? {
            return Ok(Some(name.clone()));
        }
    }
    Ok(None)
}
