//! 合规检查：占用矩阵、确定性验收、LLM 语义裁判

pub mod judge;
pub mod occupancy;
pub mod oracle;

pub use judge::{JudgeVerdict, SemanticJudge};
pub use occupancy::OccupancyTrace;
pub use oracle::{is_task_accomplished, FailureReason, TaskVerdict};
