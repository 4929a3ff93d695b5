//! Data models for alert rules and export documents

pub mod rule;

pub use rule::{AlertRule, Document, ExportDocument, Folder, RuleGroup};
