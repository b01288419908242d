//! 内置场景：reach_avoid / treasure_hunt

use crate::core::SessionError;
use crate::scenario::{NamedRegion, Region, Scenario, ScenarioKind};
use crate::trajectory::State;

pub const REACH_AVOID: &str = "reach_avoid";
pub const TREASURE_HUNT: &str = "treasure_hunt";

pub fn builtin_names() -> &'static [&'static str] {
    &[REACH_AVOID, TREASURE_HUNT]
}

/// 按名字取内置场景；未知名字是配置错误
pub fn builtin(name: &str) -> Result<Scenario, SessionError> {
    match name {
        REACH_AVOID => reach_avoid(),
        TREASURE_HUNT => treasure_hunt(),
        other => Err(SessionError::Configuration(format!(
            "unknown scenario '{}', expected one of: {}",
            other,
            builtin_names().join(", ")
        ))),
    }
}

/// 到达高处目标，避开 7 个障碍物
pub fn reach_avoid() -> Result<Scenario, SessionError> {
    let obstacles = [
        ("obstacle1", Region::new(-3., -1., -0.5, 1.5, 0.5, 2.5)),
        ("obstacle2", Region::new(-4.5, -3., 0., 2.25, 0.5, 2.)),
        ("obstacle3", Region::new(-2., -1., 4., 5., 3.5, 4.5)),
        ("obstacle4", Region::new(3., 4., -3.5, -2.5, 1., 2.)),
        ("obstacle5", Region::new(4., 5., 0., 1., 2., 3.5)),
        ("obstacle6", Region::new(2., 3.5, 1.5, 2.5, 3.75, 5.)),
        ("obstacle7", Region::new(-2., -1., -2., -1., 1., 2.)),
    ];

    let mut regions = vec![NamedRegion::new("goal", Region::new(4., 5., 4., 5., 4., 5.))];
    regions.extend(obstacles.iter().map(|(n, r)| NamedRegion::new(*n, *r)));

    Scenario::new(
        REACH_AVOID,
        regions,
        ScenarioKind::ReachAvoid {
            goal: "goal".to_string(),
            obstacles: obstacles.iter().map(|(n, _)| n.to_string()).collect(),
        },
        State::at_rest([-3.5, -3.5, 0.5]),
        25.,
        "Reach the goal while avoiding all obstacles.",
    )
}

/// 先取钥匙再过门，最后到达宝箱；全程避开墙体
pub fn treasure_hunt() -> Result<Scenario, SessionError> {
    let walls = [
        ("NE_inside_wall", Region::new(2., 5., 3., 3.5, 0., 3.)),
        ("south_mid_inside_wall", Region::new(0., 0.5, -5., -2.5, 0., 3.)),
        ("north_mid_inside_wall", Region::new(0., 0.5, -1., 5., 0., 3.)),
        ("west_inside_wall", Region::new(-2.25, -1.75, -5., 3.5, 0., 3.)),
        ("above_door_wall", Region::new(0., 0.5, -2.5, -1., 2.5, 3.)),
    ];

    let mut regions = vec![
        NamedRegion::new("door_key", Region::new(3.75, 4.75, 3.75, 4.75, 1., 2.)),
        NamedRegion::new("chest", Region::new(-4.25, -3., -4.5, -3.75, 0., 0.75)),
        NamedRegion::new("door", Region::new(0., 0.5, -2.5, -1., 0., 2.5)),
        NamedRegion::new("room_bounds", Region::new(-5., 5., -5., 5., 0., 3.)),
    ];
    regions.extend(walls.iter().map(|(n, r)| NamedRegion::new(*n, *r)));

    Scenario::new(
        TREASURE_HUNT,
        regions,
        ScenarioKind::OrderedAccess {
            target: "chest".to_string(),
            walls: walls.iter().map(|(n, _)| n.to_string()).collect(),
            gate: "door".to_string(),
            key: "door_key".to_string(),
        },
        State::at_rest([3., -4., 0.5]),
        70.,
        "Go to the key in the first 30 seconds, then go to the chest. Avoid all walls. \
         Stay in the room at all times. The door will open when you reach the key.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_validate() {
        for name in builtin_names() {
            let scenario = builtin(name).unwrap();
            assert_eq!(scenario.name(), *name);
            assert!(!scenario.default_task().is_empty());
        }
    }

    #[test]
    fn test_unknown_scenario_is_config_error() {
        let err = builtin("moon_landing").unwrap_err();
        assert!(matches!(err, SessionError::Configuration(msg) if msg.contains("moon_landing")));
    }

    #[test]
    fn test_region_order_is_declaration_order() {
        let scenario = treasure_hunt().unwrap();
        let names = scenario.region_names();
        assert_eq!(names[0], "door_key");
        assert_eq!(names[3], "room_bounds");
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_reach_avoid_horizon() {
        let scenario = reach_avoid().unwrap();
        assert_eq!(scenario.horizon(0.7).unwrap().steps, 35);
        assert_eq!(scenario.initial_state().position(), [-3.5, -3.5, 0.5]);
    }
}
