//! 占用矩阵：区域 × 时间步
//!
//! (r, t) 为 true 当且仅当第 t 个采样位置落在区域 r 的闭包围盒内。行序与场景的区域声明顺序一致。

use serde::Serialize;

use crate::core::SessionError;
use crate::scenario::Scenario;
use crate::trajectory::Trajectory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyTrace {
    region_names: Vec<String>,
    rows: Vec<Vec<bool>>,
}

impl OccupancyTrace {
    pub fn compute(scenario: &Scenario, trajectory: &Trajectory) -> Self {
        let positions: Vec<[f64; 3]> = trajectory.positions().collect();
        let (region_names, rows): (Vec<String>, Vec<Vec<bool>>) = scenario
            .regions()
            .iter()
            .map(|r| {
                let row: Vec<bool> = positions.iter().map(|p| r.region.contains(*p)).collect();
                (r.name.clone(), row)
            })
            .unzip();
        Self { region_names, rows }
    }

    /// 直接由行构造（测试与外部数据导入用）；各行长度必须一致
    pub fn from_rows<I, S>(rows: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = (S, Vec<bool>)>,
        S: Into<String>,
    {
        let (region_names, rows): (Vec<String>, Vec<Vec<bool>>) =
            rows.into_iter().map(|(n, r)| (n.into(), r)).unzip();
        if let Some(first) = rows.first() {
            if rows.iter().any(|r| r.len() != first.len()) {
                return Err(SessionError::Configuration(
                    "occupancy rows must share one length".to_string(),
                ));
            }
        }
        Ok(Self { region_names, rows })
    }

    pub fn region_names(&self) -> &[String] {
        &self.region_names
    }

    pub fn steps(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row(&self, region: &str) -> Option<&[bool]> {
        self.region_names
            .iter()
            .position(|n| n == region)
            .map(|i| self.rows[i].as_slice())
    }

    /// 规则引用的区域必须存在；不存在是配置错误而不是「从未进入」
    pub fn require_row(&self, region: &str) -> Result<&[bool], SessionError> {
        self.row(region).ok_or_else(|| {
            SessionError::Configuration(format!("region '{}' is not part of the scenario", region))
        })
    }

    /// 首次进入的时间步；从未进入返回 None
    pub fn first_entry(&self, region: &str) -> Result<Option<usize>, SessionError> {
        Ok(self.require_row(region)?.iter().position(|&inside| inside))
    }

    pub fn ever_inside(&self, region: &str) -> Result<bool, SessionError> {
        Ok(self.first_entry(region)?.is_some())
    }

    /// 逐区域的自然语言证据：始终在内 / 从未在内 / 在某些时刻在内
    pub fn render_evidence(&self) -> String {
        let mut output = String::new();
        for (name, row) in self.region_names.iter().zip(&self.rows) {
            let times: Vec<String> = row
                .iter()
                .enumerate()
                .filter(|(_, &inside)| inside)
                .map(|(t, _)| t.to_string())
                .collect();
            if times.is_empty() {
                output.push_str(&format!("The drone is never inside the {}.\n", name));
            } else if times.len() == row.len() {
                output.push_str(&format!("The drone is always inside the {}.\n", name));
            } else {
                output.push_str(&format!(
                    "The drone is inside the {} at times [{}].\n",
                    name,
                    times.join(", ")
                ));
            }
        }
        output
    }
}
