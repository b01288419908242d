//! 语义裁判：让 LLM 判断轨迹是否满足用户「真正想要」的任务
//!
//! 复用主对话（去掉开头的指令与最后一条回复），换上裁判专用的 system 指令，
//! 末尾追加占用证据，回复经 check_verdict 解析。调用次数受独立的重试预算限制，
//! 裁判对话不写回主对话；拒绝理由由会话自行回灌。

use std::sync::Arc;

use crate::analysis::OccupancyTrace;
use crate::core::{RetryBudget, SessionError};
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::spec::check_verdict;

/// 裁判结果：通过 / 拒绝（携带原始回复）/ 跳过（未启用或预算耗尽）
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeVerdict {
    Accepted,
    Rejected(String),
    Skipped,
}

pub struct SemanticJudge {
    llm: Arc<dyn LlmClient>,
    instructions: String,
    enabled: bool,
    budget: RetryBudget,
}

impl SemanticJudge {
    pub fn new(llm: Arc<dyn LlmClient>, instructions: impl Into<String>, limit: u32) -> Self {
        Self {
            llm,
            instructions: instructions.into(),
            enabled: true,
            budget: RetryBudget::new(limit),
        }
    }

    pub fn disabled(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            instructions: String::new(),
            enabled: false,
            budget: RetryBudget::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn budget(&self) -> RetryBudget {
        self.budget
    }

    /// 裁判看到的消息：裁判指令 + 主对话中段 + 占用证据
    pub fn build_messages(&self, history: &[Message], trace: &OccupancyTrace) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.instructions.clone()));
        messages.extend_from_slice(history);
        messages.push(Message::system(trace.render_evidence()));
        messages
    }

    /// `history` 为去掉前言与最后一条消息后的主对话
    pub async fn evaluate(
        &mut self,
        history: &[Message],
        trace: &OccupancyTrace,
    ) -> Result<JudgeVerdict, SessionError> {
        if !self.enabled {
            return Ok(JudgeVerdict::Skipped);
        }
        if !self.budget.try_consume() {
            tracing::warn!(
                limit = self.budget.limit(),
                "specification checker budget exhausted, accepting without check"
            );
            return Ok(JudgeVerdict::Skipped);
        }

        let messages = self.build_messages(history, trace);
        tracing::debug!(messages = messages.len(), "specification checker request");
        let response = self
            .llm
            .complete(&messages)
            .await
            .map_err(SessionError::Llm)?;
        println!("Specification checker: {}", response);

        match check_verdict(&response) {
            Some(true) => Ok(JudgeVerdict::Accepted),
            Some(false) => Ok(JudgeVerdict::Rejected(response)),
            None => {
                tracing::warn!("specification checker reply carries no verdict token, treating as rejection");
                Ok(JudgeVerdict::Rejected(response))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;

    fn trace() -> OccupancyTrace {
        OccupancyTrace::from_rows([("goal", vec![false, true])]).unwrap()
    }

    #[tokio::test]
    async fn test_build_messages_layout() {
        let judge = SemanticJudge::new(Arc::new(ScriptedLlmClient::default()), "judge it", 3);
        let history = [Message::user("reach the goal")];
        let messages = judge.build_messages(&history, &trace());
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], Message::system("judge it"));
        assert_eq!(messages[1], Message::user("reach the goal"));
        assert_eq!(
            messages[2],
            Message::system("The drone is inside the goal at times [1].\n")
        );
    }

    #[tokio::test]
    async fn test_verdicts_and_budget() {
        let llm = Arc::new(ScriptedLlmClient::new([
            "the goal is reached <accepted>",
            "obstacle hit <rejected>",
            "hmm",
        ]));
        let mut judge = SemanticJudge::new(llm.clone(), "judge it", 3);

        assert_eq!(judge.evaluate(&[], &trace()).await.unwrap(), JudgeVerdict::Accepted);
        assert_eq!(
            judge.evaluate(&[], &trace()).await.unwrap(),
            JudgeVerdict::Rejected("obstacle hit <rejected>".into())
        );
        assert_eq!(judge.evaluate(&[], &trace()).await.unwrap(), JudgeVerdict::Rejected("hmm".into()));
        // 预算耗尽后不再调用 LLM
        assert_eq!(judge.evaluate(&[], &trace()).await.unwrap(), JudgeVerdict::Skipped);
        assert_eq!(llm.call_count(), 3);
        assert_eq!(judge.budget().count(), 3);
    }

    #[tokio::test]
    async fn test_disabled_judge_never_calls_llm() {
        let llm = Arc::new(ScriptedLlmClient::default());
        let mut judge = SemanticJudge::disabled(llm.clone());
        assert_eq!(judge.evaluate(&[], &trace()).await.unwrap(), JudgeVerdict::Skipped);
        assert_eq!(llm.call_count(), 0);
    }
}
