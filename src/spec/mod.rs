//! 规格层：分隔符抽取、裁判结果识别、指令模板

pub mod extractor;
pub mod templates;

pub use extractor::{check_verdict, extract, Specification, ACCEPTED_TOKEN, REJECTED_TOKEN};
pub use templates::{instantiate_template, PromptSet, TemplateBindings};
