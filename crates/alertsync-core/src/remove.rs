//! Target resolution and listing for the remove tool

use crate::client::GrafanaClient;
use crate::error::{Error, Result};
use crate::models::AlertRule;

/// How the user pointed at the rule to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Explicit `--uid`
    Uid(String),
    /// Explicit `--name`, matched exactly against rule titles
    Name(String),
    /// Positional argument: tried as a UID first, then as a title
    Either(String),
}

impl Selector {
    /// Build a selector from CLI inputs, in priority order. `None` when no
    /// selector was given at all.
    pub fn from_args(
        uid: Option<String>,
        name: Option<String>,
        identifier: Option<String>,
    ) -> Option<Self> {
        if let Some(uid) = uid {
            Some(Self::Uid(uid))
        } else if let Some(name) = name {
            Some(Self::Name(name))
        } else {
            identifier.map(Self::Either)
        }
    }
}

/// A rule resolved for deletion, with its UID known.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveTarget {
    /// UID the DELETE call will use
    pub uid: String,
    /// The rule as it exists on the server
    pub rule: AlertRule,
}

impl RemoveTarget {
    /// Rule title, for display
    pub fn title(&self) -> &str {
        self.rule.title().unwrap_or("Unknown")
    }

    /// Rule group, for display
    pub fn group(&self) -> &str {
        self.rule.rule_group().unwrap_or("N/A")
    }
}

/// Resolve a selector to a concrete rule, or fail with a not-found error.
pub async fn resolve(client: &GrafanaClient, selector: &Selector) -> Result<RemoveTarget> {
    match selector {
        Selector::Uid(uid) => resolve_by_uid(client, uid).await,
        Selector::Name(name) => resolve_by_name(client, name).await,
        Selector::Either(identifier) => match client.alert_rule(identifier).await {
            Some(rule) => Ok(RemoveTarget {
                uid: identifier.clone(),
                rule,
            }),
            None => resolve_by_name(client, identifier).await,
        },
    }
}

async fn resolve_by_uid(client: &GrafanaClient, uid: &str) -> Result<RemoveTarget> {
    match client.alert_rule(uid).await {
        Some(rule) => Ok(RemoveTarget {
            uid: uid.to_string(),
            rule,
        }),
        None => Err(Error::not_found("Alert rule", uid)),
    }
}

async fn resolve_by_name(client: &GrafanaClient, name: &str) -> Result<RemoveTarget> {
    let rules = client.alert_rules().await?;
    let rule = rules
        .into_iter()
        .find(|rule| rule.title() == Some(name))
        .ok_or_else(|| Error::not_found("Alert rule", name))?;

    // A listed rule without a UID cannot be deleted
    let uid = rule
        .uid()
        .ok_or_else(|| Error::not_found("Alert rule", name))?
        .to_string();

    Ok(RemoveTarget { uid, rule })
}

/// Fetch and print every provisioned alert rule.
pub async fn list_rules(client: &GrafanaClient) -> Result<()> {
    let rules = client.alert_rules().await?;

    if rules.is_empty() {
        println!("No alert rules found.");
        return Ok(());
    }

    println!("Found {} alert rule(s):", rules.len());
    println!();
    for rule in &rules {
        println!("  Title: {}", rule.title().unwrap_or("N/A"));
        println!("  UID:   {}", rule.uid().unwrap_or("N/A"));
        println!("  Group: {}", rule.rule_group().unwrap_or("N/A"));
        println!();
    }

    Ok(())
}

/// Print the resolved target before deletion or dry-run.
pub fn print_target(target: &RemoveTarget) {
    println!("Alert to remove:");
    println!("  Title: {}", target.title());
    println!("  UID:   {}", target.uid);
    println!("  Group: {}", target.group());
    println!();
}
