//! SkySpec - 用自然语言驱动的无人机轨迹规划
//!
//! 模块划分：
//! - **analysis**: 占用矩阵、确定性验收与 LLM 语义裁判
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话错误、恢复动作、重试预算、状态
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **memory**: 对话历史
//! - **observability**: tracing 初始化
//! - **repair**: 语法修复环
//! - **scenario**: 场景、区域与内置场景目录
//! - **session**: 外层循环、操作员输入、会话构建
//! - **solver**: 轨迹求解器接口与外部进程实现
//! - **spec**: 规格抽取与指令模板
//! - **trajectory**: 状态与轨迹

pub mod analysis;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod repair;
pub mod scenario;
pub mod session;
pub mod solver;
pub mod spec;
pub mod trajectory;
