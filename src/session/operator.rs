//! 操作员输入：交互模式下的任务描述与轨迹确认
//!
//! 只在两轮之间读取输入，不会打断正在进行的 LLM / 求解器调用。输入流结束（EOF）等同于 quit。

use std::collections::VecDeque;
use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::core::SessionError;

pub const QUIT_COMMAND: &str = "quit";

#[async_trait]
pub trait OperatorInput: Send {
    /// 显示提示并读取一行；None 表示输入已结束
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>, SessionError>;

    /// 询问是否接受当前轨迹，非法输入重新询问；输入结束视为拒绝
    async fn confirm_trajectory(&mut self) -> Result<bool, SessionError> {
        loop {
            let Some(answer) = self.next_line("Accept the trajectory? (y/n): ").await? else {
                return Ok(false);
            };
            match answer.trim().to_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => println!("Invalid input. Please enter 'y' or 'n'."),
            }
        }
    }
}

pub fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(QUIT_COMMAND)
}

/// 标准输入
pub struct StdinOperator {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinOperator {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperatorInput for StdinOperator {
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>, SessionError> {
        print!("{}", prompt);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

/// 预置输入（测试与自动化用）
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// 已显示过的提示
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

#[async_trait]
impl OperatorInput for ScriptedOperator {
    async fn next_line(&mut self, prompt: &str) -> Result<Option<String>, SessionError> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_quit() {
        assert!(is_quit("quit"));
        assert!(is_quit("  QUIT \n"));
        assert!(!is_quit("quite far"));
    }

    #[tokio::test]
    async fn test_confirm_reprompts_on_invalid_answer() {
        let mut op = ScriptedOperator::new(["maybe", "Y"]);
        assert!(op.confirm_trajectory().await.unwrap());
        assert_eq!(op.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_eof_rejects() {
        let mut op = ScriptedOperator::default();
        assert!(!op.confirm_trajectory().await.unwrap());
    }
}
