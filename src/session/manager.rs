//! 外层循环：对话 → 抽取规格 → 求解 → 合规检查 → 拼接
//!
//! 每轮的流程：
//! 1. 有待求解的修复规格时直接进入求解，否则进行一轮对话（交互 / 自动 / 反馈）
//! 2. 从最后一条助手回复中抽取 `<...>` 规格
//! 3. 求解；不可行时交给 RecoveryEngine，语法修复成功则下一轮直接求解
//! 4. 确定性验收与语义裁判；裁判拒绝时把理由写回对话
//! 5. 接受的轨迹段拼接到总轨迹，起点前移
//!
//! 所有调用顺序执行，同一时刻最多一个外部请求在进行。

use std::sync::Arc;

use crate::analysis::{
    is_task_accomplished, JudgeVerdict, OccupancyTrace, SemanticJudge, TaskVerdict,
};
use crate::config::AppConfig;
use crate::core::{RecoveryAction, RecoveryEngine, SessionError, SessionPhase, SessionStatus};
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::repair::SyntaxRepairLoop;
use crate::scenario::Scenario;
use crate::session::operator::{is_quit, OperatorInput};
use crate::session::{SessionContext, SessionResult};
use crate::solver::{DynamicsLimits, SolveRequest, SolverOutcome, TrajectorySolver};
use crate::spec::{extract, PromptSet, Specification};
use crate::trajectory::Trajectory;

/// 裁判拒绝后请 LLM 直接给出新规格
pub const FEEDBACK_NUDGE: &str = "Please return a new specification directly, based on the feedback.";
/// 自动模式下回复里没有规格时的催促
pub const SPECIFICATION_NUDGE: &str = "Please provide the specification now.";

/// 从 AppConfig 投影出的会话开关
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub max_inputs: usize,
    pub automated_user: bool,
    pub syntax_enabled: bool,
    pub syntax_limit: u32,
    pub semantic_enabled: bool,
    pub semantic_limit: u32,
    pub manual_trajectory_check: bool,
    pub print_instructions: bool,
    pub dt: f64,
    pub dynamics: DynamicsLimits,
}

impl SessionSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            max_inputs: cfg.app.max_inputs,
            automated_user: cfg.app.automated_user,
            syntax_enabled: cfg.checker.syntax_enabled,
            syntax_limit: cfg.checker.syntax_limit,
            semantic_enabled: cfg.checker.semantic_enabled,
            semantic_limit: cfg.checker.semantic_limit,
            manual_trajectory_check: cfg.app.manual_trajectory_check,
            print_instructions: cfg.app.print_instructions,
            dt: cfg.app.dt,
            dynamics: cfg.dynamics.limits(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct ConversationManager {
    llm: Arc<dyn LlmClient>,
    solver: Arc<dyn TrajectorySolver>,
    scenario: Scenario,
    prompts: PromptSet,
    settings: SessionSettings,
    syntax: SyntaxRepairLoop,
    judge: SemanticJudge,
    recovery: RecoveryEngine,
    operator: Box<dyn OperatorInput>,
    ctx: SessionContext,
}

impl ConversationManager {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        solver: Arc<dyn TrajectorySolver>,
        scenario: Scenario,
        prompts: PromptSet,
        settings: SessionSettings,
        operator: Box<dyn OperatorInput>,
    ) -> Self {
        let syntax = SyntaxRepairLoop::new(
            llm.clone(),
            prompts.syntax_checker.clone(),
            settings.syntax_limit,
        );
        let judge = if settings.semantic_enabled {
            SemanticJudge::new(llm.clone(), prompts.spec_checker.clone(), settings.semantic_limit)
        } else {
            SemanticJudge::disabled(llm.clone())
        };
        let ctx = SessionContext::new(scenario.initial_state());
        Self {
            llm,
            solver,
            scenario,
            prompts,
            settings,
            syntax,
            judge,
            recovery: RecoveryEngine::new(),
            operator,
            ctx,
        }
    }

    /// 运行到终态，致命错误也会返回已累积的轨迹与对话
    pub async fn run(mut self) -> SessionResult {
        tracing::info!(
            session_id = %self.ctx.id,
            scenario = self.scenario.name(),
            automated = self.settings.automated_user,
            "session started"
        );

        let mut error = match self.drive().await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(session_id = %self.ctx.id, error = %e, "session aborted");
                self.ctx.status = SessionStatus::Aborted;
                Some(e)
            }
        };
        self.enter(SessionPhase::Terminal);

        if self.ctx.has_accepted_legs() {
            tracing::info!(samples = self.ctx.trajectory.len(), "The full trajectory is generated");
        } else {
            tracing::info!("No trajectories were accepted");
        }

        let trace = OccupancyTrace::compute(&self.scenario, &self.ctx.trajectory);
        let verdict = match is_task_accomplished(&trace, self.scenario.kind()) {
            Ok(verdict) => {
                match &verdict {
                    TaskVerdict::Accomplished => {
                        tracing::info!("Task accomplished: all conditions are met")
                    }
                    TaskVerdict::Failed(reason) => tracing::info!(%reason, "Task failed"),
                }
                Some(verdict)
            }
            Err(e) => {
                tracing::error!(error = %e, "final verdict unavailable");
                error.get_or_insert(e);
                None
            }
        };

        SessionResult {
            session_id: self.ctx.id,
            started_at: self.ctx.started_at,
            finished_at: chrono::Utc::now(),
            scenario: self.scenario.name().to_string(),
            status: self.ctx.status,
            messages: self.ctx.conversation.into_messages(),
            trajectory: self.ctx.trajectory,
            specification: self.ctx.specification,
            verdict,
            error,
            syntax_attempts: self.syntax.budget().count(),
            semantic_attempts: self.judge.budget().count(),
        }
    }

    fn enter(&mut self, phase: SessionPhase) {
        tracing::debug!(session_id = %self.ctx.id, phase = phase.as_str(), "phase");
        self.ctx.phase = phase;
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        while !self.ctx.status.is_terminal() {
            let spec = match self.ctx.pending_repair.take() {
                Some(spec) => spec,
                None => {
                    self.enter(SessionPhase::GatheringInput);
                    if self.conversation_turn().await? == SessionStatus::Exited {
                        self.ctx.status = SessionStatus::Exited;
                        break;
                    }
                    self.enter(SessionPhase::ExtractingSpec);
                    let spec = extract(self.ctx.conversation.last_assistant().unwrap_or_default())?;
                    self.ctx.processing_feedback = false;
                    spec
                }
            };
            println!("Extracted specification: {}", spec);
            self.ctx.specification = Some(spec.clone());

            self.enter(SessionPhase::Solving);
            let request = SolveRequest::new(
                &spec,
                &self.scenario,
                self.ctx.initial_state,
                self.settings.dt,
                self.settings.dynamics,
            );
            let leg = match self.solver.solve(&request).await.into_checked() {
                SolverOutcome::Feasible { trajectory, .. } => trajectory,
                SolverOutcome::Infeasible(reason) => {
                    tracing::warn!(%reason, "The trajectory is infeasible");
                    self.recover(SessionError::SolverInfeasible(reason), &spec)
                        .await?;
                    continue;
                }
            };
            tracing::info!(samples = leg.len(), "trajectory leg solved");

            self.enter(SessionPhase::CheckingCompliance);
            let accepted = self.check_leg(&leg, &spec).await?;
            if accepted {
                self.accept_leg(&leg);
            }
            if self.settings.automated_user && (accepted || !self.judge.is_enabled()) {
                if !accepted {
                    self.accept_leg(&leg);
                }
                self.ctx.status = SessionStatus::Completed;
            }
        }
        Ok(())
    }

    /// 一轮对话；返回 Exited 表示用户结束会话
    async fn conversation_turn(&mut self) -> Result<SessionStatus, SessionError> {
        if self.ctx.conversation.is_empty() {
            if self.settings.print_instructions {
                println!("Instructions: {}", self.prompts.conversation);
            }
            self.ctx
                .conversation
                .push(Message::system(self.prompts.conversation.clone()));
        }

        if self.ctx.processing_feedback {
            tracing::info!("Processing feedback");
            self.ctx.conversation.push(Message::system(FEEDBACK_NUDGE));
            self.ask().await?;
            return Ok(SessionStatus::Active);
        }

        if self.settings.automated_user {
            let task = self.scenario.default_task().to_string();
            println!("User: {}", task);
            self.ctx.conversation.push(Message::user(task));
            for _ in 0..self.settings.max_inputs {
                if self.ask().await?.contains('<') {
                    tracing::info!("The final response was generated");
                    break;
                }
                tracing::warn!("The final response was not generated correctly, trying again");
                self.ctx.conversation.push(Message::system(SPECIFICATION_NUDGE));
            }
            return Ok(SessionStatus::Active);
        }

        println!("Please specify the task. Type 'quit' to exit conversation and generate the final trajectory.");
        for _ in 0..self.settings.max_inputs {
            let line = match self.operator.next_line("User: ").await? {
                Some(line) if !is_quit(&line) => line,
                _ => {
                    println!("Exited conversation");
                    return Ok(SessionStatus::Exited);
                }
            };
            self.ctx.conversation.push(Message::user(line));
            if self.ask().await?.contains('<') {
                break;
            }
        }
        Ok(SessionStatus::Active)
    }

    /// 用完整历史请求 LLM，并把回复写回历史
    async fn ask(&mut self) -> Result<String, SessionError> {
        let reply = self
            .llm
            .complete(self.ctx.conversation.messages())
            .await
            .map_err(SessionError::Llm)?;
        println!("Assistant: {}", reply);
        self.ctx.conversation.push(Message::assistant(reply.clone()));
        Ok(reply)
    }

    async fn recover(&mut self, err: SessionError, spec: &Specification) -> Result<(), SessionError> {
        match self.recovery.handle(&err) {
            RecoveryAction::RepairSyntax => self.repair_syntax(err, spec).await,
            RecoveryAction::FeedBackRejection(feedback) => {
                self.ctx.conversation.push(Message::system(feedback));
                self.ctx.processing_feedback = true;
                Ok(())
            }
            RecoveryAction::Abort => Err(err),
        }
    }

    async fn repair_syntax(&mut self, err: SessionError, spec: &Specification) -> Result<(), SessionError> {
        if !self.settings.syntax_enabled {
            if self.settings.automated_user {
                return Err(err);
            }
            println!("The trajectory is infeasible. Please refine the task.");
            return Ok(());
        }
        loop {
            match self.syntax.repair(spec).await {
                Ok(fixed) => {
                    self.ctx.pending_repair = Some(fixed);
                    return Ok(());
                }
                // 每次尝试都已计入预算，耗尽后以 SyntaxBudgetExhausted 结束
                Err(SessionError::Extraction(reason)) => {
                    tracing::warn!(%reason, "syntax checker reply carries no specification");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 确定性验收（仅记录）+ 语义裁判 + 可选的人工确认
    async fn check_leg(&mut self, leg: &Trajectory, spec: &Specification) -> Result<bool, SessionError> {
        let trace = OccupancyTrace::compute(&self.scenario, leg);
        let leg_verdict = is_task_accomplished(&trace, self.scenario.kind())?;
        tracing::debug!(?leg_verdict, "leg verdict");

        let verdict = self
            .judge
            .evaluate(self.ctx.conversation.without_preamble_and_last(), &trace)
            .await?;
        let mut accepted = match verdict {
            JudgeVerdict::Accepted | JudgeVerdict::Skipped => true,
            JudgeVerdict::Rejected(reply) => {
                tracing::warn!("The trajectory is rejected by the specification checker");
                self.recover(SessionError::ComplianceRejected(reply), spec)
                    .await?;
                false
            }
        };

        if self.settings.manual_trajectory_check {
            accepted = self.operator.confirm_trajectory().await?;
        }
        Ok(accepted)
    }

    fn accept_leg(&mut self, leg: &Trajectory) {
        self.ctx.trajectory.append_leg(leg);
        if let Some(last) = leg.last() {
            self.ctx.initial_state = *last;
            println!("New position after trajectory: {:?}", last.position());
        }
        tracing::info!(samples = self.ctx.trajectory.len(), "The trajectory is accepted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;
    use crate::scenario;
    use crate::session::ScriptedOperator;
    use crate::solver::ScriptedSolver;
    use crate::trajectory::State;

    fn prompts() -> PromptSet {
        PromptSet {
            conversation: "converse".into(),
            syntax_checker: "fix syntax".into(),
            spec_checker: "judge".into(),
        }
    }

    fn feasible(points: &[[f64; 3]]) -> SolverOutcome {
        SolverOutcome::Feasible {
            trajectory: Trajectory::new(points.iter().map(|&p| State::at_rest(p)).collect()),
            controls: vec![],
        }
    }

    fn automated() -> SessionSettings {
        SessionSettings {
            automated_user: true,
            ..SessionSettings::default()
        }
    }

    #[tokio::test]
    async fn test_nudge_until_delimited_reply() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "Let me think about it.",
            "<eventually(inside(goal), 0, 35)>",
            "Fine. <accepted>",
        ]));
        let solver = Arc::new(ScriptedSolver::new([feasible(&[[-3.5, -3.5, 0.5], [4.5, 4.5, 4.5]])]));
        let manager = ConversationManager::new(
            llm.clone(),
            solver,
            scenario::reach_avoid().unwrap(),
            prompts(),
            automated(),
            Box::new(ScriptedOperator::default()),
        );
        let result = manager.run().await;

        assert_eq!(result.status, SessionStatus::Completed);
        let calls = llm.calls();
        assert_eq!(calls[1].last(), Some(&Message::system(SPECIFICATION_NUDGE)));
    }

    #[tokio::test]
    async fn test_rejection_is_fed_back_once() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "<first>",
            "Too close to the obstacle. <rejected>",
            "<second>",
            "Looks right. <accepted>",
        ]));
        let solver = Arc::new(ScriptedSolver::new([
            feasible(&[[-3.5, -3.5, 0.5], [0., 0., 0.]]),
            feasible(&[[-3.5, -3.5, 0.5], [4.5, 4.5, 4.5]]),
        ]));
        let manager = ConversationManager::new(
            llm.clone(),
            solver.clone(),
            scenario::reach_avoid().unwrap(),
            prompts(),
            automated(),
            Box::new(ScriptedOperator::default()),
        );
        let result = manager.run().await;

        assert_eq!(result.status, SessionStatus::Completed);
        assert_eq!(solver.specs(), vec!["first", "second"]);
        assert_eq!(result.semantic_attempts, 2);
        assert!(result.messages.contains(&Message::system(
            "Specification checker: Too close to the obstacle. <rejected>"
        )));
        assert!(result.messages.contains(&Message::system(FEEDBACK_NUDGE)));
        // 只拼接了被接受的第二段
        assert_eq!(result.trajectory.len(), 2);
        assert_eq!(result.trajectory.last().map(|s| s.position()), Some([4.5, 4.5, 4.5]));
        assert!(result.task_accomplished());
    }

    #[tokio::test]
    async fn test_quit_before_any_leg() {
        let manager = ConversationManager::new(
            Arc::new(ScriptedLlmClient::default()),
            Arc::new(ScriptedSolver::default()),
            scenario::reach_avoid().unwrap(),
            prompts(),
            SessionSettings::default(),
            Box::new(ScriptedOperator::new(["quit"])),
        );
        let result = manager.run().await;

        assert_eq!(result.status, SessionStatus::Exited);
        assert_eq!(result.trajectory.len(), 1);
        assert!(!result.task_accomplished());
        assert!(result.error.is_none());
    }
}
