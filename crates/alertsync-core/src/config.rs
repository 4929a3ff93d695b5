//! Connection configuration for the Grafana server

use crate::error::{Error, Result};

/// Connection settings for a Grafana server, read from the environment.
///
/// Authentication is either a service account token (`GRAFANA_TOKEN`) or a
/// basic-auth pair (`GRAFANA_USER` + `GRAFANA_PASSWORD`). At least one of the
/// two must be configured.
#[derive(Debug, Clone)]
pub struct GrafanaConfig {
    /// Base URL of the Grafana server, without trailing slash
    pub url: String,
    /// Service account token
    pub token: Option<String>,
    /// Basic auth username
    pub user: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

impl GrafanaConfig {
    /// Load configuration from the process environment.
    ///
    /// A local `.env` file is loaded first if present; variables already set
    /// in the environment are not overridden, and a missing file is not an
    /// error.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_values(
            env_var("GRAFANA_URL"),
            env_var("GRAFANA_TOKEN"),
            env_var("GRAFANA_USER"),
            env_var("GRAFANA_PASSWORD"),
        )
    }

    fn from_values(
        url: Option<String>,
        token: Option<String>,
        user: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let url = non_empty(url)
            .ok_or_else(|| Error::config("GRAFANA_URL environment variable is required"))?;
        let token = non_empty(token);
        let user = non_empty(user);
        let password = non_empty(password);

        if token.is_none() && !(user.is_some() && password.is_some()) {
            return Err(Error::config(
                "Either GRAFANA_TOKEN or GRAFANA_USER/GRAFANA_PASSWORD required",
            ));
        }

        Ok(Self {
            url: url.strip_suffix('/').unwrap_or(&url).to_string(),
            token,
            user,
            password,
        })
    }

    /// Human-readable description of the configured auth scheme, for the
    /// startup banner.
    pub fn auth_label(&self) -> &'static str {
        if self.token.is_some() {
            "Service Account Token"
        } else {
            "Basic Auth"
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// Empty values behave as if the variable were unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn opt(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_url_required() {
        let err = GrafanaConfig::from_values(None, opt("glsa_token"), None, None).unwrap_err();
        assert!(err.to_string().contains("GRAFANA_URL"));
    }

    #[test]
    fn test_empty_url_is_missing() {
        let err = GrafanaConfig::from_values(opt(""), opt("glsa_token"), None, None).unwrap_err();
        assert!(err.to_string().contains("GRAFANA_URL"));
    }

    #[rstest]
    #[case(None, None, None, false)]
    #[case(Some("glsa_token"), None, None, true)]
    #[case(None, Some("admin"), Some("secret"), true)]
    #[case(None, Some("admin"), None, false)]
    #[case(None, None, Some("secret"), false)]
    #[case(Some(""), Some("admin"), Some(""), false)]
    fn test_credential_validation(
        #[case] token: Option<&str>,
        #[case] user: Option<&str>,
        #[case] password: Option<&str>,
        #[case] ok: bool,
    ) {
        let result = GrafanaConfig::from_values(
            opt("https://grafana.example.com"),
            token.map(String::from),
            user.map(String::from),
            password.map(String::from),
        );
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_strips_one_trailing_slash() {
        let config = GrafanaConfig::from_values(
            opt("https://grafana.example.com/"),
            opt("glsa_token"),
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.url, "https://grafana.example.com");
    }

    #[test]
    fn test_url_without_trailing_slash_unchanged() {
        let config = GrafanaConfig::from_values(
            opt("https://grafana.example.com"),
            opt("glsa_token"),
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.url, "https://grafana.example.com");
    }

    #[test]
    fn test_auth_label() {
        let token = GrafanaConfig::from_values(opt("http://g"), opt("t"), None, None).unwrap();
        assert_eq!(token.auth_label(), "Service Account Token");

        let basic =
            GrafanaConfig::from_values(opt("http://g"), None, opt("admin"), opt("pw")).unwrap();
        assert_eq!(basic.auth_label(), "Basic Auth");
    }
}
