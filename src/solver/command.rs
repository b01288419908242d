//! 外部进程求解器
//!
//! 启动配置的命令，把 SolveRequest 以 JSON 写入 stdin，从 stdout 读取：
//! `{"states": [[x, y, z, vx, vy, vz], ...], "controls": [[ax, ay, az], ...]}` 或 `{"error": "..."}`。
//! 状态中的 null 解码为 NaN；非零退出码、超时或 error 字段均视为不可行。
//! 超时覆盖写入请求与等待输出两段；timeout_secs 为 0 时不限时。

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::solver::{SolveRequest, SolverOutcome, TrajectorySolver};
use crate::trajectory::{State, Trajectory};

#[derive(Debug, Deserialize)]
struct SolveResponse {
    #[serde(default)]
    states: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    controls: Vec<[f64; 3]>,
    error: Option<String>,
}

pub struct CommandSolver {
    program: String,
    args: Vec<String>,
    timeout_secs: u64,
}

impl CommandSolver {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_secs,
        }
    }

    /// 由 `[program, args...]` 构造；空命令返回 None
    pub fn from_command_line(command: &[String], timeout_secs: u64) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), timeout_secs))
    }

    async fn run(&self, request: &SolveRequest) -> Result<String, String> {
        let payload = serde_json::to_vec(request).map_err(|e| e.to_string())?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("cannot start solver '{}': {}", self.program, e))?;

        let exchange = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(&payload)
                    .await
                    .map_err(|e| format!("cannot write solve request: {}", e))?;
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| format!("Solver failed: {}", e))
        };

        // 0 表示不限时，与 LLM 请求超时一致
        let output = if self.timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(self.timeout_secs), exchange)
                .await
                .map_err(|_| format!("Solver timed out after {}s", self.timeout_secs))??
        } else {
            exchange.await?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("Solver failed: exit {:?}: {}", output.status.code(), stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// 解析求解器输出；这里只做格式校验，全 NaN 检查由 SolverOutcome::into_checked 负责
pub fn parse_response(raw: &str) -> SolverOutcome {
    let response: SolveResponse = match serde_json::from_str(raw.trim()) {
        Ok(r) => r,
        Err(e) => return SolverOutcome::Infeasible(format!("malformed solver output: {}", e)),
    };
    if let Some(error) = response.error {
        return SolverOutcome::Infeasible(format!("Solver failed: {}", error));
    }

    let mut states = Vec::with_capacity(response.states.len());
    for (t, row) in response.states.iter().enumerate() {
        if row.len() != 6 {
            return SolverOutcome::Infeasible(format!(
                "state {} has {} components, expected 6",
                t,
                row.len()
            ));
        }
        let mut values = [f64::NAN; 6];
        for (slot, v) in values.iter_mut().zip(row) {
            *slot = v.unwrap_or(f64::NAN);
        }
        states.push(State(values));
    }

    SolverOutcome::Feasible {
        trajectory: Trajectory::new(states),
        controls: response.controls,
    }
}

#[async_trait]
impl TrajectorySolver for CommandSolver {
    async fn solve(&self, request: &SolveRequest) -> SolverOutcome {
        tracing::info!(program = %self.program, horizon_secs = request.horizon_secs, "external solver run");
        match self.run(request).await {
            Ok(stdout) => parse_response(&stdout),
            Err(e) => SolverOutcome::Infeasible(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feasible_response() {
        let raw = r#"{"states": [[0,0,0,0,0,0],[1,0,0,0.5,0,0]], "controls": [[1,0,0]]}"#;
        match parse_response(raw) {
            SolverOutcome::Feasible { trajectory, controls } => {
                assert_eq!(trajectory.len(), 2);
                assert_eq!(trajectory.last().unwrap().position(), [1., 0., 0.]);
                assert_eq!(controls, vec![[1., 0., 0.]]);
            }
            other => panic!("expected feasible, got {other:?}"),
        }
    }

    #[test]
    fn test_null_values_decode_as_nan() {
        let raw = r#"{"states": [[null,null,null,null,null,null]]}"#;
        let outcome = parse_response(raw);
        assert!(matches!(&outcome, SolverOutcome::Feasible { trajectory, .. } if trajectory.is_all_invalid()));
        assert!(matches!(outcome.into_checked(), SolverOutcome::Infeasible(_)));
    }

    #[test]
    fn test_error_and_malformed_output_are_infeasible() {
        assert!(matches!(
            parse_response(r#"{"error": "Model is infeasible"}"#),
            SolverOutcome::Infeasible(msg) if msg.contains("Model is infeasible")
        ));
        assert!(matches!(parse_response("Traceback ..."), SolverOutcome::Infeasible(_)));
        assert!(matches!(parse_response(r#"{"states": [[1,2,3]]}"#), SolverOutcome::Infeasible(_)));
    }

    #[test]
    fn test_from_command_line() {
        assert!(CommandSolver::from_command_line(&[], 10).is_none());
        let solver =
            CommandSolver::from_command_line(&["python3".into(), "solve.py".into()], 10).unwrap();
        assert_eq!(solver.program, "python3");
        assert_eq!(solver.args, vec!["solve.py".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_program_is_infeasible() {
        let solver = CommandSolver::new("/nonexistent/skyspec-solver", vec![], 5);
        assert!(matches!(solver.solve(&sample_request()).await, SolverOutcome::Infeasible(_)));
    }

    fn sample_request() -> SolveRequest {
        let scenario = crate::scenario::reach_avoid().unwrap();
        SolveRequest::new(
            &crate::spec::Specification::new("x"),
            &scenario,
            scenario.initial_state(),
            0.7,
            Default::default(),
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_timeout_waits_for_solver() {
        let script = r#"cat > /dev/null; sleep 0.2; echo '{"error": "no path"}'"#;
        let solver = CommandSolver::new("sh", vec!["-c".into(), script.into()], 0);
        match solver.solve(&sample_request()).await {
            SolverOutcome::Infeasible(msg) => {
                assert!(msg.contains("no path"), "unexpected message: {msg}");
                assert!(!msg.contains("timed out"));
            }
            other => panic!("expected solver error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_solver_times_out() {
        let solver = CommandSolver::new("sh", vec!["-c".into(), "sleep 5".into()], 1);
        assert!(matches!(
            solver.solve(&sample_request()).await,
            SolverOutcome::Infeasible(msg) if msg.contains("timed out after 1s")
        ));
    }
}
