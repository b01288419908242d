//! 会话错误类型与恢复动作
//!
//! 与 RecoveryEngine 配合：根据 SessionError 决定 RepairSyntax / FeedBackRejection / Abort。

use serde::Serialize;
use thiserror::Error;

/// 会话运行过程中可能出现的错误（抽取、求解、合规、配置、LLM、IO）
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SessionError {
    /// LLM 回复中找不到 `<...>` 分隔的规格
    #[error("Specification not found: {0}")]
    Extraction(String),

    /// 求解器报错或返回全无效轨迹
    #[error("The trajectory is infeasible: {0}")]
    SolverInfeasible(String),

    #[error("Exceeded the maximum number of syntax check iterations ({attempts})")]
    SyntaxBudgetExhausted { attempts: u32 },

    /// 语义裁判拒绝了轨迹，携带裁判回复
    #[error("Trajectory rejected by the specification checker: {0}")]
    ComplianceRejected(String),

    /// 场景缺少被规则引用的区域、模板文件缺失、场景名未知等
    #[error("Config error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Io(e.to_string())
    }
}

/// 恢复引擎根据错误类型给出的建议动作
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryAction {
    /// 把规格交给语法修复环，修复后直接重新求解
    RepairSyntax,
    /// 将裁判的拒绝理由写回对话，请 LLM 直接给出新规格
    FeedBackRejection(String),
    /// 终止会话
    Abort,
}
