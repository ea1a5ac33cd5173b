// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration and the database.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use parley_config::model::ParleyConfig;
use parley_core::{HealthStatus, ParleyError, PluginAdapter, StorageAdapter};
use parley_storage::SqliteStorage;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `parley doctor` command. With `plain`, disables colored output.
pub async fn run_doctor(config: &ParleyConfig, plain: bool) -> Result<(), ParleyError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_read_tracking(config),
        check_database(config).await,
    ];

    println!();
    println!("  parley doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Report the effective read tracking settings.
fn check_read_tracking(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    let message = format!(
        "{} writes, {} posts per page",
        config.read_state.write_policy, config.forum.posts_per_page
    );
    CheckResult::new("Read tracking", CheckStatus::Pass, message, start)
}

/// Open the database, run migrations and query it once.
async fn check_database(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
    }

    let result = match storage.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Database",
            CheckStatus::Pass,
            format!("connected ({})", config.storage.database_path),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    };
    if let Err(e) = storage.close().await {
        return CheckResult::new("Database", CheckStatus::Warn, format!("close failed: {e}"), start);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_tagged() {
        let result = CheckResult {
            name: "Database".into(),
            status: CheckStatus::Fail,
            message: "open failed".into(),
            duration: Duration::from_millis(3),
        };
        let line = format_line(&result, false);
        assert!(line.contains("[FAIL] Database"), "got {line}");
        assert!(line.ends_with("open failed (3ms)"));
    }

    #[tokio::test]
    async fn database_check_passes_on_temp_db() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ParleyConfig::default();
        config.storage.database_path = dir.path().join("doctor.db").to_string_lossy().into_owned();

        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }

    #[tokio::test]
    async fn database_check_fails_on_unusable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let mut config = ParleyConfig::default();
        config.storage.database_path = blocker.join("doctor.db").to_string_lossy().into_owned();

        let result = check_database(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.starts_with("open failed"), "{}", result.message);
    }
}
