//! 场景模型：命名区域、初始状态、时间范围、默认任务文本，以及按场景种类划分的验收规则参数
//!
//! 验收规则所需的「目标区域 / 禁入区域 / 顺序约束」由 ScenarioKind 的字段显式给出，
//! 新增场景时扩展 catalogue 即可，其他模块不按区域名做字符串判断。

pub mod catalogue;
pub mod region;

use serde::Serialize;

use crate::core::SessionError;
use crate::trajectory::State;

pub use catalogue::{builtin, builtin_names, reach_avoid, treasure_hunt};
pub use region::{NamedRegion, Region};

/// 场景种类及其验收规则引用的区域名
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ScenarioKind {
    /// 到达 goal，且从未进入任何障碍物
    ReachAvoid {
        goal: String,
        obstacles: Vec<String>,
    },
    /// 到达 target，从未进入墙体，且不能先于 key 进入 gate
    OrderedAccess {
        target: String,
        walls: Vec<String>,
        gate: String,
        key: String,
    },
}

impl ScenarioKind {
    /// 规则引用的全部区域名
    pub fn referenced_regions(&self) -> Vec<&str> {
        match self {
            ScenarioKind::ReachAvoid { goal, obstacles } => std::iter::once(goal.as_str())
                .chain(obstacles.iter().map(String::as_str))
                .collect(),
            ScenarioKind::OrderedAccess {
                target,
                walls,
                gate,
                key,
            } => [target.as_str(), gate.as_str(), key.as_str()]
                .into_iter()
                .chain(walls.iter().map(String::as_str))
                .collect(),
        }
    }
}

/// 离散时间范围：步数 × 步长
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Horizon {
    pub steps: usize,
    pub dt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    name: String,
    regions: Vec<NamedRegion>,
    kind: ScenarioKind,
    initial_state: State,
    duration_secs: f64,
    default_task: String,
}

impl Scenario {
    /// 构造并校验：区域名唯一，规则引用的区域必须存在
    pub fn new(
        name: impl Into<String>,
        regions: Vec<NamedRegion>,
        kind: ScenarioKind,
        initial_state: State,
        duration_secs: f64,
        default_task: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let scenario = Self {
            name: name.into(),
            regions,
            kind,
            initial_state,
            duration_secs,
            default_task: default_task.into(),
        };
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), SessionError> {
        for (i, r) in self.regions.iter().enumerate() {
            if self.regions[..i].iter().any(|o| o.name == r.name) {
                return Err(SessionError::Configuration(format!(
                    "scenario '{}' declares region '{}' twice",
                    self.name, r.name
                )));
            }
        }
        for name in self.kind.referenced_regions() {
            if self.region(name).is_none() {
                return Err(SessionError::Configuration(format!(
                    "scenario '{}' has no region named '{}'",
                    self.name, name
                )));
            }
        }
        if !(self.duration_secs > 0.0) {
            return Err(SessionError::Configuration(format!(
                "scenario '{}' has non-positive duration {}",
                self.name, self.duration_secs
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regions(&self) -> &[NamedRegion] {
        &self.regions
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.region)
    }

    pub fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.name.clone()).collect()
    }

    pub fn kind(&self) -> &ScenarioKind {
        &self.kind
    }

    pub fn initial_state(&self) -> State {
        self.initial_state
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// 步数 = floor(duration / dt)
    pub fn horizon(&self, dt: f64) -> Result<Horizon, SessionError> {
        if !(dt > 0.0) {
            return Err(SessionError::Configuration(format!(
                "time step must be positive, got {dt}"
            )));
        }
        Ok(Horizon {
            steps: (self.duration_secs / dt).floor() as usize,
            dt,
        })
    }

    /// 自动模式下喂给 LLM 的任务文本
    pub fn default_task(&self) -> &str {
        &self.default_task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes() -> Vec<NamedRegion> {
        vec![
            NamedRegion::new("goal", Region::new(4., 5., 4., 5., 4., 5.)),
            NamedRegion::new("rock", Region::new(0., 1., 0., 1., 0., 1.)),
        ]
    }

    #[test]
    fn test_missing_referenced_region_fails_fast() {
        let err = Scenario::new(
            "broken",
            boxes(),
            ScenarioKind::ReachAvoid {
                goal: "goal".into(),
                obstacles: vec!["boulder".into()],
            },
            State::at_rest([0., 0., 0.]),
            10.,
            "go",
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Configuration(msg) if msg.contains("boulder")));
    }

    #[test]
    fn test_duplicate_region_rejected() {
        let mut regions = boxes();
        regions.push(NamedRegion::new("rock", Region::new(2., 3., 2., 3., 2., 3.)));
        let err = Scenario::new(
            "dup",
            regions,
            ScenarioKind::ReachAvoid {
                goal: "goal".into(),
                obstacles: vec![],
            },
            State::at_rest([0., 0., 0.]),
            10.,
            "go",
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
    }

    #[test]
    fn test_horizon_floors_duration() {
        let scenario = Scenario::new(
            "ok",
            boxes(),
            ScenarioKind::ReachAvoid {
                goal: "goal".into(),
                obstacles: vec!["rock".into()],
            },
            State::at_rest([0., 0., 0.]),
            25.,
            "go",
        )
        .unwrap();
        let horizon = scenario.horizon(0.7).unwrap();
        assert_eq!(horizon.steps, 35);
        assert!(scenario.horizon(0.0).is_err());
    }
}
