//! 状态与轨迹
//!
//! 状态为 [x, y, z, vx, vy, vz]；轨迹是定长状态序列，下标 0 为初始状态。
//! 多段任务按段拼接：新段首个采样与上一段末采样相同，拼接时丢弃。

use serde::{Deserialize, Serialize};

/// 位置 + 速度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State(pub [f64; 6]);

impl State {
    pub const fn new(position: [f64; 3], velocity: [f64; 3]) -> Self {
        let [x, y, z] = position;
        let [vx, vy, vz] = velocity;
        Self([x, y, z, vx, vy, vz])
    }

    /// 静止于某位置
    pub const fn at_rest(position: [f64; 3]) -> Self {
        Self::new(position, [0., 0., 0.])
    }

    pub fn position(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    pub fn is_all_nan(&self) -> bool {
        self.0.iter().all(|v| v.is_nan())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trajectory {
    states: Vec<State>,
}

impl Trajectory {
    pub fn new(states: Vec<State>) -> Self {
        Self { states }
    }

    /// 只含初始状态的轨迹（会话累积轨迹的起点）
    pub fn starting_at(x0: State) -> Self {
        Self { states: vec![x0] }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.states.iter().map(State::position)
    }

    pub fn first(&self) -> Option<&State> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&State> {
        self.states.last()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// 整条轨迹全部为 NaN（求解器的另一种不可行信号）；空轨迹同样视为无效
    pub fn is_all_invalid(&self) -> bool {
        self.states.iter().all(State::is_all_nan)
    }

    /// 追加一段已接受的轨迹，丢弃其首个采样（与当前末采样重复）
    pub fn append_leg(&mut self, leg: &Trajectory) {
        if self.states.is_empty() {
            self.states.extend_from_slice(&leg.states);
        } else {
            self.states.extend(leg.states.iter().skip(1).copied());
        }
    }
}
