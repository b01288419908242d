//! SkySpec 基准程序：以自动模式重复运行同一场景，统计确定性验收通过率
//!
//! 用法：`skyspec-bench [runs] [config.toml]`，runs 默认 10。

use std::path::PathBuf;

use anyhow::Context;
use skyspec::{
    config::{load_config, AppConfig},
    observability,
    session::{create_llm_from_config, create_solver_from_config, SessionBuilder, ScriptedOperator},
};

const DEFAULT_RUNS: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let mut args = std::env::args().skip(1);
    let runs = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("invalid run count '{}'", raw))?,
        None => DEFAULT_RUNS,
    };
    let config_path = args.next().map(PathBuf::from);

    let mut cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::one_shot()
    });
    // 基准只跑无人值守的自动模式
    cfg.app.automated_user = true;
    cfg.app.manual_trajectory_check = false;

    let llm = create_llm_from_config(&cfg);
    let solver = create_solver_from_config(&cfg).context("Failed to create solver")?;

    let mut accomplished = 0usize;
    let mut aborted = 0usize;
    for run in 1..=runs {
        tracing::info!(run, runs, scenario = %cfg.app.scenario, "benchmark run started");
        // 自动模式不会读取操作员输入
        let manager = SessionBuilder::new(cfg.clone())
            .with_llm(llm.clone())
            .with_solver(solver.clone())
            .build(Box::new(ScriptedOperator::default()))
            .context("Failed to assemble session")?;

        let result = manager.run().await;
        if let Some(e) = &result.error {
            tracing::warn!(run, error = %e, "benchmark run failed");
            aborted += 1;
        }
        if result.task_accomplished() {
            accomplished += 1;
        }
        println!(
            "Run {}/{}: status {:?}, accomplished {}",
            run,
            runs,
            result.status,
            result.task_accomplished()
        );
    }

    let (prompt, completion, total) = llm.token_usage();
    println!();
    println!("Scenario: {}", cfg.app.scenario);
    println!("Accomplished: {}/{} (aborted: {})", accomplished, runs, aborted);
    println!("Tokens: prompt {}, completion {}, total {}", prompt, completion, total);
    Ok(())
}
