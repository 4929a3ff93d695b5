//! # alertsync
//!
//! Sync Grafana alert rules with the provisioning API.
//!
//! Two command-line tools over one small client library:
//!
//! - **alert-import**: import alert rules from JSON files, creating or
//!   updating each rule by UID. Accepts single rules, lists of rules, and
//!   Grafana export documents with groups and folders.
//! - **alert-remove**: remove one alert rule by UID or title, with a listing
//!   mode and an interactive confirmation prompt.
//!
//! Connection settings come from `GRAFANA_URL` plus either `GRAFANA_TOKEN` or
//! `GRAFANA_USER`/`GRAFANA_PASSWORD`, optionally loaded from a local `.env`
//! file.
//!
//! ## Quick Start
//!
//! ```bash
//! export GRAFANA_URL=https://grafana.example.com
//! export GRAFANA_TOKEN=glsa_xxxxxxxxxxxx
//!
//! alert-import alerts/*.json
//! alert-remove --name "High CPU Usage"
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod remove;

pub use client::GrafanaClient;
pub use config::GrafanaConfig;
pub use error::{Error, Result};
