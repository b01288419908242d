//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SKYSPEC__*` 覆盖（双下划线表示嵌套，如 `SKYSPEC__CHECKER__SYNTAX_LIMIT=3`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::solver::DynamicsLimits;
use crate::spec::templates::{INTERACTIVE_INSTRUCTIONS, ONE_SHOT_INSTRUCTIONS};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub checker: CheckerSection,
    #[serde(default)]
    pub dynamics: DynamicsSection,
    #[serde(default)]
    pub solver: SolverSection,
}

/// [app] 段：场景、步长、输入轮数、自动用户、模板位置
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_scenario")]
    pub scenario: String,
    /// 离散步长（秒）
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// 单次对话轮内最多向用户（或 LLM）请求的次数
    #[serde(default = "default_max_inputs")]
    pub max_inputs: usize,
    /// true 时用场景默认任务文本代替人工输入，首条被接受的轨迹后结束
    #[serde(default)]
    pub automated_user: bool,
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
    /// 对话用指令文件名；未设置时按 automated_user 选择
    pub instructions_file: Option<String>,
    #[serde(default)]
    pub print_instructions: bool,
    /// 每段轨迹求解后由操作员 y/n 确认
    #[serde(default)]
    pub manual_trajectory_check: bool,
}

fn default_scenario() -> String {
    "reach_avoid".to_string()
}

fn default_dt() -> f64 {
    0.7
}

fn default_max_inputs() -> usize {
    10
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("config/prompts")
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            scenario: default_scenario(),
            dt: default_dt(),
            max_inputs: default_max_inputs(),
            automated_user: false,
            prompts_dir: default_prompts_dir(),
            instructions_file: None,
            print_instructions: false,
            manual_trajectory_check: false,
        }
    }
}

impl AppSection {
    pub fn instructions_file(&self) -> &str {
        match &self.instructions_file {
            Some(name) => name,
            None if self.automated_user => ONE_SHOT_INSTRUCTIONS,
            None => INTERACTIVE_INSTRUCTIONS,
        }
    }
}

/// [llm] 段：后端选择、模型、温度与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：openai / deepseek / mock；最终选择还取决于 API Key 是否存在
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    crate::llm::DEFAULT_TEMPERATURE
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

/// [checker] 段：语法修复与语义裁判的开关和次数上限
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerSection {
    #[serde(default = "default_true")]
    pub syntax_enabled: bool,
    #[serde(default = "default_check_limit")]
    pub syntax_limit: u32,
    #[serde(default = "default_true")]
    pub semantic_enabled: bool,
    #[serde(default = "default_check_limit")]
    pub semantic_limit: u32,
}

fn default_true() -> bool {
    true
}

fn default_check_limit() -> u32 {
    5
}

impl Default for CheckerSection {
    fn default() -> Self {
        Self {
            syntax_enabled: true,
            syntax_limit: default_check_limit(),
            semantic_enabled: true,
            semantic_limit: default_check_limit(),
        }
    }
}

/// [dynamics] 段：最大加速度 / 最大速度
#[derive(Debug, Clone, Deserialize)]
pub struct DynamicsSection {
    #[serde(default = "default_max_acc")]
    pub max_acc: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
}

fn default_max_acc() -> f64 {
    10.
}

fn default_max_speed() -> f64 {
    0.5
}

impl Default for DynamicsSection {
    fn default() -> Self {
        Self {
            max_acc: default_max_acc(),
            max_speed: default_max_speed(),
        }
    }
}

impl DynamicsSection {
    pub fn limits(&self) -> DynamicsLimits {
        DynamicsLimits {
            max_acc: self.max_acc,
            max_speed: self.max_speed,
        }
    }
}

/// [solver] 段：外部求解器命令（程序 + 参数）与超时
#[derive(Debug, Clone, Deserialize)]
pub struct SolverSection {
    #[serde(default)]
    pub command: Vec<String>,
    /// 秒，0 表示不限时
    #[serde(default = "default_solver_timeout")]
    pub timeout_secs: u64,
}

fn default_solver_timeout() -> u64 {
    300
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_secs: default_solver_timeout(),
        }
    }
}

impl AppConfig {
    /// 交互模式：检查器关闭，由操作员逐段确认轨迹
    pub fn interactive() -> Self {
        let mut cfg = Self::default();
        cfg.app.automated_user = false;
        cfg.app.manual_trajectory_check = true;
        cfg.checker.syntax_enabled = false;
        cfg.checker.semantic_enabled = false;
        cfg
    }

    /// 一次性自动模式：场景默认任务，语法修复与语义裁判全部开启
    pub fn one_shot() -> Self {
        let mut cfg = Self::default();
        cfg.app.automated_user = true;
        cfg.app.manual_trajectory_check = false;
        cfg.checker.syntax_enabled = true;
        cfg.checker.semantic_enabled = true;
        cfg
    }
}

/// 从 config 目录加载配置，环境变量 SKYSPEC__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SKYSPEC__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(env_source("SKYSPEC"));

    let c = builder.build()?;
    c.try_deserialize()
}

/// `<PREFIX>__SECTION__KEY` 环境变量源；solver.command 按空格拆成参数列表
fn env_source(prefix: &str) -> config::Environment {
    config::Environment::with_prefix(prefix)
        .separator("__")
        .try_parsing(true)
        .list_separator(" ")
        .with_list_parse_key("solver.command")
}
