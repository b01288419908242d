//! SkySpec - 用自然语言驱动的无人机轨迹规划
//!
//! 入口：初始化日志、加载配置、组装会话并运行外层循环。
//! 用法：`skyspec [config.toml]`，其余选项通过 config/default.toml 或 SKYSPEC__* 环境变量设置。

use std::path::PathBuf;

use anyhow::Context;
use skyspec::{
    config::{load_config, AppConfig},
    observability,
    session::{SessionBuilder, SessionResult, StdinOperator},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let manager = SessionBuilder::new(cfg)
        .build(Box::new(StdinOperator::new()))
        .context("Failed to assemble session")?;

    let result = manager.run().await;
    print_summary(&result);

    let aborted = result.is_aborted();
    match result.error {
        Some(e) if aborted => Err(e).context("Session aborted"),
        _ => Ok(()),
    }
}

fn print_summary(result: &SessionResult) {
    println!();
    println!("Session {} ({})", result.session_id, result.scenario);
    println!("Status: {:?}", result.status);
    if let Some(spec) = &result.specification {
        println!("Last specification: {}", spec);
    }
    println!("Trajectory samples: {}", result.trajectory.len());
    println!(
        "Checker calls: syntax {}, specification {}",
        result.syntax_attempts, result.semantic_attempts
    );
    match &result.verdict {
        Some(verdict) => println!(
            "Task accomplished: {}{}",
            verdict.is_accomplished(),
            match verdict {
                skyspec::analysis::TaskVerdict::Failed(reason) => format!(" ({})", reason),
                skyspec::analysis::TaskVerdict::Accomplished => String::new(),
            }
        ),
        None => println!("Task accomplished: unknown"),
    }
}
