//! Import engine: file parsing, rule extraction, and create-or-update

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::client::GrafanaClient;
use crate::error::Error;
use crate::models::{AlertRule, Document, ExportDocument};

/// Running totals for an import or dry-run pass.
///
/// Import mode counts rules (plus one failure per unreadable file); dry-run
/// mode counts files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rules (or files, in dry-run) that went through
    pub succeeded: usize,
    /// Rules (or files) that did not
    pub failed: usize,
}

impl ImportSummary {
    const FAILED_FILE: Self = Self {
        succeeded: 0,
        failed: 1,
    };

    /// True when nothing failed
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn add(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// Import alert rules from `files` in order, creating or updating each rule.
///
/// Prints per-rule progress and a final summary line; the returned totals
/// decide the process exit code.
pub async fn run(
    client: &GrafanaClient,
    files: &[PathBuf],
    folder_override: Option<&str>,
) -> ImportSummary {
    let importer = Importer {
        client,
        folder_override,
    };

    let mut summary = ImportSummary::default();
    for path in files {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            summary.add(ImportSummary::FAILED_FILE);
            continue;
        }
        summary.add(importer.import_file(path).await);
    }

    print_summary(&summary);
    summary
}

/// Validate `files` without touching the network.
///
/// Uses the same parse and field validation as [`run`], stopping short of any
/// API call.
pub fn check(files: &[PathBuf]) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for path in files {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            summary.add(ImportSummary::FAILED_FILE);
            continue;
        }
        summary.add(check_file(path));
    }

    print_summary(&summary);
    summary
}

fn print_summary(summary: &ImportSummary) {
    println!();
    println!(
        "Summary: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
}

struct Importer<'a> {
    client: &'a GrafanaClient,
    folder_override: Option<&'a str>,
}

impl Importer<'_> {
    async fn import_file(&self, path: &Path) -> ImportSummary {
        println!("Processing: {}", path.display());

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("  Error: {e}");
                return ImportSummary::FAILED_FILE;
            }
        };

        let mut rules = match Document::parse(&text) {
            Ok(Document::Export(export)) => {
                println!("  Detected Grafana export format");
                let rules = self.extract_rules(export).await;
                if rules.is_empty() {
                    eprintln!("  Error: No valid rules found in export");
                    return ImportSummary::FAILED_FILE;
                }
                rules
            }
            Ok(Document::Rules(rules)) => rules,
            Err(e) => {
                eprintln!("  Error: Invalid JSON - {e}");
                return ImportSummary::FAILED_FILE;
            }
        };

        if let Some(folder_uid) = self.folder_override {
            for rule in &mut rules {
                rule.set_folder_uid(folder_uid);
            }
        }

        let total = rules.len();
        let mut succeeded = 0;
        for rule in &rules {
            if let Some(field) = rule.missing_field() {
                eprintln!("{}", Error::MissingField(field));
                continue;
            }
            if self.push_rule(rule).await {
                succeeded += 1;
            }
        }

        ImportSummary {
            succeeded,
            failed: total - succeeded,
        }
    }

    /// Flatten an export document into standalone rules, injecting the group
    /// name and resolved folder UID into each one.
    async fn extract_rules(&self, export: ExportDocument) -> Vec<AlertRule> {
        // One folder listing per file at most
        let mut folders: Option<HashMap<String, String>> = None;
        let mut rules = Vec::new();

        for group in export.groups {
            let group_name = group.group_name().to_string();

            let folder_uid = if let Some(folder_uid) = self.folder_override {
                Some(folder_uid.to_string())
            } else if let Some(folder_name) = group.folder_name() {
                if folders.is_none() {
                    folders = Some(self.fetch_folders().await);
                }
                let resolved = folders
                    .as_ref()
                    .and_then(|map| map.get(folder_name))
                    .cloned();
                match resolved {
                    Some(uid) => Some(uid),
                    None => {
                        eprintln!(
                            "  Warning: Folder '{folder_name}' not found, skipping group '{group_name}'"
                        );
                        continue;
                    }
                }
            } else {
                None
            };

            for mut rule in group.rules {
                rule.set_rule_group(&group_name);
                if let Some(uid) = &folder_uid {
                    rule.set_folder_uid(uid);
                }
                rules.push(rule);
            }
        }

        rules
    }

    async fn fetch_folders(&self) -> HashMap<String, String> {
        match self.client.folders().await {
            Ok(folders) => folders.into_iter().map(|f| (f.title, f.uid)).collect(),
            Err(e) => {
                debug!(error = %e, "folder listing failed");
                HashMap::new()
            }
        }
    }

    /// Create the rule, or update it when its UID already exists remotely.
    /// Returns whether the rule made it to the server.
    async fn push_rule(&self, rule: &AlertRule) -> bool {
        let title = rule.title().unwrap_or("Unnamed");

        let existing_uid = match rule.uid() {
            Some(uid) => self.client.alert_rule(uid).await.map(|_| uid),
            None => None,
        };

        let outcome = match existing_uid {
            Some(uid) => self
                .client
                .update_alert_rule(uid, rule)
                .await
                .map(|result| ("Updated", result)),
            None => self
                .client
                .create_alert_rule(rule)
                .await
                .map(|result| ("Created", result)),
        };

        match outcome {
            Ok((verb, result)) => {
                println!("  {verb}: {title} (UID: {})", result.uid().unwrap_or("N/A"));
                true
            }
            Err(e) => {
                eprintln!("  Error importing '{title}': {e}");
                false
            }
        }
    }
}

fn check_file(path: &Path) -> ImportSummary {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            println!("✗ {} - {e}", path.display());
            return ImportSummary::FAILED_FILE;
        }
    };

    match Document::parse(&text) {
        Ok(Document::Export(export)) => {
            println!("✓ {} (Grafana export format)", path.display());
            println!(
                "  Contains {} group(s), {} rule(s)",
                export.groups.len(),
                export.rule_count()
            );
            ImportSummary {
                succeeded: 1,
                failed: 0,
            }
        }
        Ok(Document::Rules(rules)) => {
            let mut valid = true;
            for rule in &rules {
                if let Some(field) = rule.missing_field() {
                    eprintln!("{}", Error::MissingField(field));
                    valid = false;
                }
            }
            println!("{} {}", if valid { "✓" } else { "✗" }, path.display());
            if valid {
                ImportSummary {
                    succeeded: 1,
                    failed: 0,
                }
            } else {
                ImportSummary::FAILED_FILE
            }
        }
        Err(e) => {
            println!("✗ {} - Invalid JSON: {e}", path.display());
            ImportSummary::FAILED_FILE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrafanaConfig;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GrafanaClient {
        GrafanaClient::new(&GrafanaConfig {
            url: server.uri(),
            token: Some("glsa_test".to_string()),
            user: None,
            password: None,
        })
        .unwrap()
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file = dir.path().join(name);
        fs::write(&file, content).unwrap();
        file
    }

    fn created(uid: &str) -> ResponseTemplate {
        ResponseTemplate::new(201).set_body_json(json!({"uid": uid}))
    }

    #[tokio::test]
    async fn test_rule_without_uid_is_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .respond_with(created("new01"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "cpu.json",
            r#"{"title": "High CPU", "condition": "A", "data": [{"refId": "A"}]}"#,
        );

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_existing_uid_is_updated_not_created() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/api/v1/provisioning/alert-rules/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uid": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(url_path("/api/v1/provisioning/alert-rules/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uid": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .respond_with(created("never"))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "cpu.json",
            r#"{"uid": "abc123", "title": "High CPU", "condition": "A", "data": []}"#,
        );

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_unknown_uid_falls_back_to_create() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/api/v1/provisioning/alert-rules/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .respond_with(created("fresh"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "cpu.json",
            r#"{"uid": "ghost", "title": "High CPU", "condition": "A", "data": []}"#,
        );

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_export_flattens_groups_with_folder_resolution() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/api/folders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"title": "Prod", "uid": "prod01"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .and(body_partial_json(json!({
                "title": "r1", "ruleGroup": "infra", "folderUID": "prod01"
            })))
            .respond_with(created("u1"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .and(body_partial_json(json!({"title": "r2", "ruleGroup": "app"})))
            .respond_with(created("u2"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "export.json",
            r#"{
                "apiVersion": 1,
                "groups": [
                    {
                        "name": "infra",
                        "folder": "Prod",
                        "rules": [{"title": "r1", "condition": "A", "data": []}]
                    },
                    {
                        "name": "app",
                        "rules": [{"title": "r2", "condition": "B", "data": []}]
                    }
                ]
            }"#,
        );

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_unresolvable_folder_skips_group_and_fails_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/api/folders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .respond_with(created("never"))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "export.json",
            r#"{
                "apiVersion": 1,
                "groups": [{
                    "name": "infra",
                    "folder": "Prod",
                    "rules": [{"title": "r1", "condition": "A", "data": []}]
                }]
            }"#,
        );

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_folder_override_reaches_every_rule_without_lookup() {
        let server = MockServer::start().await;
        // No /api/folders mock: an override must never trigger the lookup
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .and(body_partial_json(json!({"folderUID": "override01"})))
            .respond_with(created("u1"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let export = write_file(
            &dir,
            "export.json",
            r#"{
                "apiVersion": 1,
                "groups": [{
                    "name": "infra",
                    "folder": "Prod",
                    "rules": [{"title": "r1", "condition": "A", "data": []}]
                }]
            }"#,
        );
        let single = write_file(
            &dir,
            "single.json",
            r#"{"title": "r2", "condition": "A", "data": [], "folderUID": "original"}"#,
        );

        let summary = run(&client_for(&server), &[export, single], Some("override01")).await;
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_invalid_rule_is_skipped_and_counted_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .and(body_partial_json(json!({"title": "valid"})))
            .respond_with(created("u1"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "mixed.json",
            r#"[
                {"title": "no-condition", "data": []},
                {"title": "valid", "condition": "A", "data": []}
            ]"#,
        );

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_http_error_does_not_halt_remaining_rules() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .and(body_partial_json(json!({"title": "bad"})))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(url_path("/api/v1/provisioning/alert-rules"))
            .and(body_partial_json(json!({"title": "good"})))
            .respond_with(created("u2"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "two.json",
            r#"[
                {"title": "bad", "condition": "A", "data": []},
                {"title": "good", "condition": "A", "data": []}
            ]"#,
        );

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_missing_file_counts_one_failure() {
        let server = MockServer::start().await;
        let summary = run(
            &client_for(&server),
            &[PathBuf::from("/no/such/file.json")],
            None,
        )
        .await;
        assert_eq!(summary, ImportSummary { succeeded: 0, failed: 1 });
    }

    #[tokio::test]
    async fn test_malformed_json_counts_one_failure() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "broken.json", "{not json");

        let summary = run(&client_for(&server), &[file], None).await;
        assert_eq!(summary, ImportSummary { succeeded: 0, failed: 1 });
    }

    #[test]
    fn test_check_valid_single_rule() {
        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "cpu.json",
            r#"{"title": "High CPU", "condition": "A", "data": []}"#,
        );

        let summary = check(&[file]);
        assert_eq!(summary, ImportSummary { succeeded: 1, failed: 0 });
    }

    #[test]
    fn test_check_flags_missing_condition() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "cpu.json", r#"{"title": "High CPU", "data": []}"#);

        let summary = check(&[file]);
        assert_eq!(summary, ImportSummary { succeeded: 0, failed: 1 });
    }

    #[test]
    fn test_check_export_reports_counts_as_success() {
        let dir = TempDir::new().unwrap();
        let file = write_file(
            &dir,
            "export.json",
            r#"{"apiVersion": 1, "groups": [{"name": "g", "rules": [{"title": "r"}]}]}"#,
        );

        let summary = check(&[file]);
        assert_eq!(summary, ImportSummary { succeeded: 1, failed: 0 });
    }

    #[test]
    fn test_check_invalid_json() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "broken.json", "[");

        let summary = check(&[file]);
        assert_eq!(summary, ImportSummary { succeeded: 0, failed: 1 });
    }
}
