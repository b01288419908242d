//! 修复层：语法修复环

pub mod syntax;

pub use syntax::SyntaxRepairLoop;
