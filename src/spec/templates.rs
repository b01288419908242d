//! 指令模板：从 prompts 目录加载，并替换占位符
//!
//! 占位符：`OBJECTS` -> 区域名列表，`T_MAX` -> 时间范围步数。未出现的占位符不处理，
//! 模板里其它文本原样保留。缺少模板文件是配置错误。

use std::path::{Path, PathBuf};

use crate::core::SessionError;

pub const OBJECTS_PLACEHOLDER: &str = "OBJECTS";
pub const HORIZON_PLACEHOLDER: &str = "T_MAX";

pub const INTERACTIVE_INSTRUCTIONS: &str = "instructions.txt";
pub const ONE_SHOT_INSTRUCTIONS: &str = "one_shot_instructions.txt";
pub const SYNTAX_CHECKER_INSTRUCTIONS: &str = "syntax_checker_instructions.txt";
pub const SPEC_CHECK_INSTRUCTIONS: &str = "spec_check_instructions.txt";

/// 占位符取值
#[derive(Debug, Clone)]
pub struct TemplateBindings {
    pub objects: Vec<String>,
    pub horizon_steps: usize,
}

impl TemplateBindings {
    /// 形如 `['goal', 'obstacle1']`
    pub fn render_objects(&self) -> String {
        let quoted: Vec<String> = self.objects.iter().map(|o| format!("'{}'", o)).collect();
        format!("[{}]", quoted.join(", "))
    }
}

pub fn instantiate_template(template: &str, bindings: &TemplateBindings) -> String {
    template
        .replace(OBJECTS_PLACEHOLDER, &bindings.render_objects())
        .replace(HORIZON_PLACEHOLDER, &bindings.horizon_steps.to_string())
}

/// 读取单个模板文件
pub fn load_template(dir: &Path, file_name: &str) -> Result<String, SessionError> {
    let path = dir.join(file_name);
    std::fs::read_to_string(&path).map_err(|e| {
        SessionError::Configuration(format!(
            "cannot read instruction template {}: {}",
            path.display(),
            e
        ))
    })
}

/// 一次会话所需的三份已实例化指令：对话、语法修复、语义裁判
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub conversation: String,
    pub syntax_checker: String,
    pub spec_checker: String,
}

impl PromptSet {
    /// 启动时一次性加载并实例化，任一文件缺失立即失败
    pub fn load(
        dir: impl Into<PathBuf>,
        conversation_file: &str,
        bindings: &TemplateBindings,
    ) -> Result<Self, SessionError> {
        let dir = dir.into();
        let load = |name: &str| -> Result<String, SessionError> {
            Ok(instantiate_template(&load_template(&dir, name)?, bindings))
        };
        Ok(Self {
            conversation: load(conversation_file)?,
            syntax_checker: load(SYNTAX_CHECKER_INSTRUCTIONS)?,
            spec_checker: load(SPEC_CHECK_INSTRUCTIONS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> TemplateBindings {
        TemplateBindings {
            objects: vec!["goal".into(), "obstacle1".into()],
            horizon_steps: 35,
        }
    }

    #[test]
    fn test_instantiate_replaces_all_occurrences() {
        let out = instantiate_template("Objects: OBJECTS. Use OBJECTS within T_MAX steps.", &bindings());
        assert_eq!(
            out,
            "Objects: ['goal', 'obstacle1']. Use ['goal', 'obstacle1'] within 35 steps."
        );
    }

    #[test]
    fn test_unknown_placeholders_left_verbatim() {
        let out = instantiate_template("Speed limit MAX_SPEED, horizon T_MAX", &bindings());
        assert_eq!(out, "Speed limit MAX_SPEED, horizon 35");
    }

    #[test]
    fn test_prompt_set_loads_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INTERACTIVE_INSTRUCTIONS), "talk about OBJECTS").unwrap();
        std::fs::write(dir.path().join(SYNTAX_CHECKER_INSTRUCTIONS), "fix syntax, T_MAX").unwrap();
        std::fs::write(dir.path().join(SPEC_CHECK_INSTRUCTIONS), "judge").unwrap();

        let prompts = PromptSet::load(dir.path(), INTERACTIVE_INSTRUCTIONS, &bindings()).unwrap();
        assert_eq!(prompts.conversation, "talk about ['goal', 'obstacle1']");
        assert_eq!(prompts.syntax_checker, "fix syntax, 35");
        assert_eq!(prompts.spec_checker, "judge");
    }

    #[test]
    fn test_missing_template_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INTERACTIVE_INSTRUCTIONS), "x").unwrap();
        let err = PromptSet::load(dir.path(), INTERACTIVE_INSTRUCTIONS, &bindings()).unwrap_err();
        assert!(
            matches!(err, SessionError::Configuration(msg) if msg.contains(SYNTAX_CHECKER_INSTRUCTIONS))
        );
    }
}
