use anyhow::{bail, Context, Result};

use crate::storage::github::DEFAULT_API_URL;
use crate::storage::GitHubStoreConfig;

const DEFAULT_PROMPTS_FILE: &str = "prompty.json";

/// Where the prompt document lives.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { path: String },
    GitHub(GitHubStoreConfig),
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub anthropic_api_key: String,
    pub admin_passphrase: String,
    pub operator_language: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            storage: storage_from_env()?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            admin_passphrase: require_env("ADMIN_PASSPHRASE")?,
            operator_language: env_or("OPERATOR_LANGUAGE", "Czech"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn storage_from_env() -> Result<StorageConfig> {
    match env_or("STORAGE_BACKEND", "local").to_lowercase().as_str() {
        "local" => Ok(StorageConfig::Local {
            path: env_or("PROMPTS_FILE", DEFAULT_PROMPTS_FILE),
        }),
        "github" => {
            let full_name = require_env("GITHUB_REPO")?;
            let (owner, repo) = parse_repo(&full_name)?;
            Ok(StorageConfig::GitHub(GitHubStoreConfig {
                token: require_env("GITHUB_TOKEN")?,
                owner,
                repo,
                path: env_or("GITHUB_FILE_PATH", DEFAULT_PROMPTS_FILE),
                branch: env_or("GITHUB_BRANCH", "main"),
                api_url: env_or("GITHUB_API_URL", DEFAULT_API_URL),
            }))
        }
        other => bail!("STORAGE_BACKEND must be 'local' or 'github', got '{other}'"),
    }
}

/// Splits `owner/name`.
fn parse_repo(full_name: &str) -> Result<(String, String)> {
    match full_name.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!("GITHUB_REPO must look like 'owner/name', got '{full_name}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo() {
        assert_eq!(
            parse_repo("acme/prompts").unwrap(),
            ("acme".to_string(), "prompts".to_string())
        );
        assert!(parse_repo("acme").is_err());
        assert!(parse_repo("/prompts").is_err());
        assert!(parse_repo("acme/prompts/extra").is_err());
    }

    #[test]
    fn test_missing_required_env_names_the_variable() {
        let err = require_env("PROMPTOVISTE_TEST_SURELY_UNSET").unwrap_err();
        assert!(err.to_string().contains("PROMPTOVISTE_TEST_SURELY_UNSET"));
    }
}
