//! 轨迹求解器端口
//!
//! 求解器本身是外部协作者：输入规格、区域、初始状态与时间范围，输出状态轨迹与控制序列。
//! 「求解失败」与「返回全 NaN 轨迹」统一表示为 SolverOutcome::Infeasible，由修复环一致处理。

pub mod command;
pub mod scripted;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::scenario::{Region, Scenario};
use crate::spec::Specification;
use crate::trajectory::{State, Trajectory};

pub use command::CommandSolver;
pub use scripted::ScriptedSolver;

/// 动力学约束
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DynamicsLimits {
    /// 最大加速度 m/s^2
    pub max_acc: f64,
    /// 最大速度 m/s
    pub max_speed: f64,
}

impl Default for DynamicsLimits {
    fn default() -> Self {
        Self {
            max_acc: 10.,
            max_speed: 0.5,
        }
    }
}

/// 一次求解请求（也是外部进程的 JSON 输入）
#[derive(Debug, Clone, Serialize)]
pub struct SolveRequest {
    pub spec: String,
    pub regions: BTreeMap<String, Region>,
    pub initial_state: State,
    pub horizon_secs: f64,
    pub dt: f64,
    pub dynamics: DynamicsLimits,
}

impl SolveRequest {
    pub fn new(
        spec: &Specification,
        scenario: &Scenario,
        initial_state: State,
        dt: f64,
        dynamics: DynamicsLimits,
    ) -> Self {
        Self {
            spec: spec.as_str().to_string(),
            regions: scenario
                .regions()
                .iter()
                .map(|r| (r.name.clone(), r.region))
                .collect(),
            initial_state,
            horizon_secs: scenario.duration_secs(),
            dt,
            dynamics,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    Feasible {
        trajectory: Trajectory,
        controls: Vec<[f64; 3]>,
    },
    Infeasible(String),
}

impl SolverOutcome {
    /// 全 NaN 轨迹降级为不可行；会话对任何实现的返回值都做这一步检查
    pub fn into_checked(self) -> Self {
        match self {
            SolverOutcome::Feasible { trajectory, .. } if trajectory.is_all_invalid() => {
                SolverOutcome::Infeasible("The trajectory is infeasible.".to_string())
            }
            other => other,
        }
    }
}

#[async_trait]
pub trait TrajectorySolver: Send + Sync {
    async fn solve(&self, request: &SolveRequest) -> SolverOutcome;
}
