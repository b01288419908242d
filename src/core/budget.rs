//! 修复环的重试预算
//!
//! (count, limit)：每次修复尝试无论成败都计数一次；预算允许 limit 次修复，
//! 加上首次尝试，总尝试次数不超过 limit + 1。

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryBudget {
    count: u32,
    limit: u32,
}

impl RetryBudget {
    pub fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= self.limit
    }

    /// 申请一次修复尝试：未耗尽则计数并返回 true，耗尽则返回 false 且不计数
    pub fn try_consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.count += 1;
        true
    }
}
