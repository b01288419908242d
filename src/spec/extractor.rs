//! 规格抽取与裁判结果识别
//!
//! 分隔符协议：LLM 把最终规格包在 `<` `>` 中；取最后一对（后出现的文本视为更权威）。
//! 裁判只认 `<accepted>` / `<rejected>` 两个字面量。

use std::fmt;

use serde::Serialize;

use crate::core::SessionError;

pub const ACCEPTED_TOKEN: &str = "<accepted>";
pub const REJECTED_TOKEN: &str = "<rejected>";

/// 抽取出的形式化任务描述（对本模块不透明）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specification(String);

impl Specification {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 顺序扫描不重叠的 `<...>`，保留最后一个，换行替换为空格。
///
/// 不处理嵌套：找到 `<` 后取其后第一个 `>`；`<` 之后再无 `>` 时停止扫描。
/// 没有任何成对分隔符，或最后一对内容为空，都视为未找到。
pub fn extract(text: &str) -> Result<Specification, SessionError> {
    let mut last: Option<&str> = None;
    let mut cursor = 0;

    while let Some(open) = text[cursor..].find('<').map(|i| cursor + i) {
        let Some(close) = text[open + 1..].find('>').map(|i| open + 1 + i) else {
            break;
        };
        last = Some(&text[open + 1..close]);
        cursor = close + 1;
    }

    match last {
        Some(spec) if !spec.is_empty() => Ok(Specification(spec.replace('\n', " "))),
        _ => Err(SessionError::Extraction(
            "No specification found in the response.".to_string(),
        )),
    }
}

/// `<accepted>` 优先于 `<rejected>`；两者都没有时返回 None
pub fn check_verdict(text: &str) -> Option<bool> {
    let accepted = text.contains(ACCEPTED_TOKEN);
    let rejected = text.contains(REJECTED_TOKEN);
    if accepted && rejected {
        tracing::warn!("checker reply contains both verdict tokens, treating as accepted");
    }
    if accepted {
        Some(true)
    } else if rejected {
        Some(false)
    } else {
        None
    }
}
