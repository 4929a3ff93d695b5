//! Alert rule and export document models
//!
//! Rules are kept as raw JSON objects rather than typed structs so that
//! fields this tool does not know about (annotations, labels, datasource
//! payloads) survive the file-to-API round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Fields every alert definition must carry before it is sent to the API
const REQUIRED_FIELDS: [&str; 3] = ["title", "condition", "data"];

/// A single alert rule as an untyped JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertRule(serde_json::Map<String, Value>);

impl AlertRule {
    /// The rule's `title`, when present and a string
    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    /// The rule's `uid`, when present and non-empty
    pub fn uid(&self) -> Option<&str> {
        self.get_str("uid").filter(|uid| !uid.is_empty())
    }

    /// The rule's `ruleGroup`, when present and a string
    pub fn rule_group(&self) -> Option<&str> {
        self.get_str("ruleGroup")
    }

    /// Set (or overwrite) the rule's evaluation group
    pub fn set_rule_group(&mut self, group: &str) {
        self.0
            .insert("ruleGroup".to_string(), Value::String(group.to_string()));
    }

    /// Set (or overwrite) the rule's folder identifier
    pub fn set_folder_uid(&mut self, uid: &str) {
        self.0
            .insert("folderUID".to_string(), Value::String(uid.to_string()));
    }

    /// First required field absent from this rule, if any.
    ///
    /// Presence is all that is checked; an explicit `null` counts as present.
    pub fn missing_field(&self) -> Option<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .find(|field| !self.0.contains_key(*field))
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// A Grafana export document: rules bundled under named groups.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Export schema version
    pub api_version: i64,
    /// Rule groups in the export
    pub groups: Vec<RuleGroup>,
}

impl ExportDocument {
    /// Total number of rules across all groups
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }
}

/// One named group of rules inside an export document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleGroup {
    /// Group name, `"default"` when absent
    pub name: Option<String>,
    /// Human-readable folder title to resolve to a folder UID
    pub folder: Option<String>,
    /// Rules in this group, lacking `ruleGroup`/`folderUID`
    #[serde(default)]
    pub rules: Vec<AlertRule>,
}

impl RuleGroup {
    /// Group name with the `"default"` fallback applied
    pub fn group_name(&self) -> &str {
        self.name.as_deref().unwrap_or("default")
    }

    /// Folder title, treating an empty string as unset
    pub fn folder_name(&self) -> Option<&str> {
        self.folder.as_deref().filter(|f| !f.is_empty())
    }
}

/// A Grafana folder, indexed by title for lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Folder {
    /// Human-readable folder title
    pub title: String,
    /// Stable folder identifier
    pub uid: String,
}

/// A parsed alert definition file, with format already detected.
///
/// Both the import path and the dry-run path go through this one parse
/// routine so the two modes cannot drift in what they accept.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Grafana export format (`apiVersion` + `groups`)
    Export(ExportDocument),
    /// One rule, or a list of rules
    Rules(Vec<AlertRule>),
}

impl Document {
    /// Parse a JSON document and detect its format.
    ///
    /// An object carrying both `apiVersion` and `groups` is an export; an
    /// array is a list of rules; any other object is a single rule. Scalars
    /// and malformed JSON are errors.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) if map.contains_key("apiVersion") && map.contains_key("groups") => {
                let export: ExportDocument = serde_json::from_value(Value::Object(map))?;
                Ok(Self::Export(export))
            }
            Value::Array(_) => {
                let rules: Vec<AlertRule> = serde_json::from_value(value)?;
                Ok(Self::Rules(rules))
            }
            Value::Object(map) => Ok(Self::Rules(vec![AlertRule(map)])),
            // Scalars fail with serde's "invalid type" error
            other => {
                let rule: AlertRule = serde_json::from_value(other)?;
                Ok(Self::Rules(vec![rule]))
            }
        }
    }
}
