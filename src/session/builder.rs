//! 会话构建器：按配置组装 LLM、求解器、场景与指令模板

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::SessionError;
use crate::llm::{create_deepseek_client, deepseek_model_for, LlmClient, MockLlmClient, OpenAiClient};
use crate::scenario::{self, Scenario};
use crate::session::{ConversationManager, OperatorInput, SessionSettings};
use crate::solver::{CommandSolver, TrajectorySolver};
use crate::spec::{PromptSet, TemplateBindings};

/// 根据 provider 与环境变量中的 API Key 选择 LLM 后端；都不可用时退回 Mock
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    if provider == "mock" {
        tracing::info!("Using Mock LLM");
        return Arc::new(MockLlmClient);
    }

    let use_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok()
        && (provider == "deepseek" || std::env::var("OPENAI_API_KEY").is_err());
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "deepseek";

    if use_deepseek {
        let model = deepseek_model_for(&cfg.llm.model);
        tracing::info!("Using DeepSeek LLM ({})", model);
        Arc::new(
            create_deepseek_client(Some(model))
                .with_temperature(cfg.llm.temperature)
                .with_request_timeout(cfg.llm.timeouts.request),
        )
    } else if use_openai {
        tracing::info!("Using OpenAI LLM ({})", cfg.llm.model);
        Arc::new(
            OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &cfg.llm.model,
                std::env::var("OPENAI_API_KEY").ok().as_deref(),
            )
            .with_temperature(cfg.llm.temperature)
            .with_request_timeout(cfg.llm.timeouts.request),
        )
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient)
    }
}

/// [solver].command 为空时返回配置错误
pub fn create_solver_from_config(cfg: &AppConfig) -> Result<Arc<dyn TrajectorySolver>, SessionError> {
    let solver = CommandSolver::from_command_line(&cfg.solver.command, cfg.solver.timeout_secs)
        .ok_or_else(|| {
            SessionError::Configuration(
                "solver.command is empty; set it in config/default.toml or SKYSPEC__SOLVER__COMMAND"
                    .to_string(),
            )
        })?;
    tracing::info!(command = ?cfg.solver.command, "Using external trajectory solver");
    Ok(Arc::new(solver))
}

/// 按场景区域名与时间步数实例化三份指令
pub fn load_prompts(cfg: &AppConfig, scenario: &Scenario) -> Result<PromptSet, SessionError> {
    let horizon = scenario.horizon(cfg.app.dt)?;
    let bindings = TemplateBindings {
        objects: scenario.region_names(),
        horizon_steps: horizon.steps,
    };
    PromptSet::load(cfg.app.prompts_dir.clone(), cfg.app.instructions_file(), &bindings)
}

/// 组装 ConversationManager；LLM / 求解器 / 场景可单独替换（测试与 bench 使用）
pub struct SessionBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    solver: Option<Arc<dyn TrajectorySolver>>,
    scenario: Option<Scenario>,
    prompts: Option<PromptSet>,
}

impl SessionBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            solver: None,
            scenario: None,
            prompts: None,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_solver(mut self, solver: Arc<dyn TrajectorySolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    /// 跳过模板目录，直接使用已实例化的指令
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = Some(prompts);
        self
    }

    /// 场景、模板、求解器任一缺失都在这里失败，不会进入会话
    pub fn build(self, operator: Box<dyn OperatorInput>) -> Result<ConversationManager, SessionError> {
        let scenario = match self.scenario {
            Some(s) => s,
            None => scenario::builtin(&self.config.app.scenario)?,
        };
        let prompts = match self.prompts {
            Some(p) => p,
            None => load_prompts(&self.config, &scenario)?,
        };
        let solver = match self.solver {
            Some(s) => s,
            None => create_solver_from_config(&self.config)?,
        };
        let llm = self
            .llm
            .unwrap_or_else(|| create_llm_from_config(&self.config));

        tracing::info!(
            scenario = scenario.name(),
            instructions = self.config.app.instructions_file(),
            "session assembled"
        );
        Ok(ConversationManager::new(
            llm,
            solver,
            scenario,
            prompts,
            SessionSettings::from_config(&self.config),
            operator,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ScriptedOperator;
    use crate::solver::ScriptedSolver;
    use crate::spec::templates::{
        INTERACTIVE_INSTRUCTIONS, SPEC_CHECK_INSTRUCTIONS, SYNTAX_CHECKER_INSTRUCTIONS,
    };

    #[test]
    fn test_mock_provider_short_circuits() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "mock".into();
        let llm = create_llm_from_config(&cfg);
        assert_eq!(llm.token_usage(), (0, 0, 0));
    }

    #[test]
    fn test_empty_solver_command_is_configuration_error() {
        let err = create_solver_from_config(&AppConfig::default()).err();
        assert!(matches!(err, Some(SessionError::Configuration(_))));
    }

    #[test]
    fn test_prompts_instantiated_from_scenario() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INTERACTIVE_INSTRUCTIONS), "Objects: OBJECTS, T_MAX steps").unwrap();
        std::fs::write(dir.path().join(SYNTAX_CHECKER_INSTRUCTIONS), "syntax").unwrap();
        std::fs::write(dir.path().join(SPEC_CHECK_INSTRUCTIONS), "judge within T_MAX").unwrap();

        let mut cfg = AppConfig::default();
        cfg.app.prompts_dir = dir.path().to_path_buf();
        cfg.app.dt = 1.0;
        let scenario = scenario::reach_avoid().unwrap();
        let prompts = load_prompts(&cfg, &scenario).unwrap();
        assert!(prompts.conversation.starts_with("Objects: ['goal', 'obstacle1'"));
        assert!(prompts.conversation.ends_with(", 25 steps"));
        assert_eq!(prompts.spec_checker, "judge within 25");
    }

    #[test]
    fn test_unknown_scenario_fails_before_session() {
        let mut cfg = AppConfig::default();
        cfg.app.scenario = "moon_base".into();
        let result = SessionBuilder::new(cfg)
            .with_solver(Arc::new(ScriptedSolver::default()))
            .build(Box::new(ScriptedOperator::default()));
        assert!(matches!(result, Err(SessionError::Configuration(_))));
    }
}
