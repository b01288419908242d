//! 语法修复环
//!
//! 求解器拒绝规格时，把原规格连同语法修复指令作为一次独立对话发给 LLM（不写入主对话），
//! 再用同一套分隔符协议抽取修复后的规格。预算耗尽即为致命错误。

use std::sync::Arc;

use crate::core::{RetryBudget, SessionError};
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::spec::{extract, Specification};

pub struct SyntaxRepairLoop {
    llm: Arc<dyn LlmClient>,
    instructions: String,
    budget: RetryBudget,
}

impl SyntaxRepairLoop {
    pub fn new(llm: Arc<dyn LlmClient>, instructions: impl Into<String>, limit: u32) -> Self {
        Self {
            llm,
            instructions: instructions.into(),
            budget: RetryBudget::new(limit),
        }
    }

    pub fn budget(&self) -> RetryBudget {
        self.budget
    }

    /// 修复请求的消息：语法指令 + 原规格
    pub fn build_messages(&self, spec: &Specification) -> Vec<Message> {
        vec![
            Message::system(self.instructions.clone()),
            Message::user(format!("Original specification: {}", spec)),
        ]
    }

    /// 消耗一次预算并请求修复；即使 LLM 或抽取失败，本次尝试也已计数
    pub async fn repair(&mut self, spec: &Specification) -> Result<Specification, SessionError> {
        if !self.budget.try_consume() {
            return Err(SessionError::SyntaxBudgetExhausted {
                attempts: self.budget.count(),
            });
        }
        tracing::info!(
            attempt = self.budget.count(),
            limit = self.budget.limit(),
            "Checking the syntax of the specification"
        );

        let response = self
            .llm
            .complete(&self.build_messages(spec))
            .await
            .map_err(SessionError::Llm)?;
        println!("Syntax checker: {}", response);
        extract(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;

    #[tokio::test]
    async fn test_repair_extracts_corrected_spec() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "Fixed the parenthesis: <eventually(inside(goal), 0, 35)>",
        ]));
        let mut repair = SyntaxRepairLoop::new(llm.clone(), "fix it", 2);
        let fixed = repair
            .repair(&Specification::new("eventually(inside(goal), 0, 35"))
            .await
            .unwrap();
        assert_eq!(fixed.as_str(), "eventually(inside(goal), 0, 35)");

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0], Message::system("fix it"));
        assert_eq!(
            calls[0][1],
            Message::user("Original specification: eventually(inside(goal), 0, 35")
        );
    }

    #[tokio::test]
    async fn test_budget_counts_failed_attempts_and_then_stops() {
        let llm = Arc::new(ScriptedLlmClient::new(["no delimiters", "<ok>", "<unused>"]));
        let mut repair = SyntaxRepairLoop::new(llm.clone(), "fix it", 2);
        let spec = Specification::new("broken");

        assert!(matches!(repair.repair(&spec).await, Err(SessionError::Extraction(_))));
        assert_eq!(repair.repair(&spec).await.unwrap().as_str(), "ok");
        assert_eq!(
            repair.repair(&spec).await,
            Err(SessionError::SyntaxBudgetExhausted { attempts: 2 })
        );
        assert_eq!(llm.call_count(), 2);
    }
}
