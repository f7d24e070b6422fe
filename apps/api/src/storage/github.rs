//! Prompt document stored as a file in a GitHub repository, through the
//! Contents API.
//!
//! Writes use the blob SHA for optimistic concurrency: the current SHA is
//! fetched right before each PUT, and if it no longer matches the one this
//! store last observed, another writer got there first and the save is refused.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{decode_document, encode_document, Loaded, PromptStore, StoreError};
use crate::models::PromptRecord;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("promptoviste/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GitHubStoreConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub api_url: String,
}

impl GitHubStoreConfig {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// What this store last saw of the remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Observed {
    Unknown,
    Absent,
    Sha(String),
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: PutContentsFile,
}

#[derive(Debug, Deserialize)]
struct PutContentsFile {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

pub struct GitHubStore {
    client: Client,
    config: GitHubStoreConfig,
    observed: Mutex<Observed>,
}

impl GitHubStore {
    pub fn new(config: GitHubStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            config,
            observed: Mutex::new(Observed::Unknown),
        })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.path.trim_start_matches('/'),
        )
    }

    /// Fetches the current file, `None` when it does not exist on the branch.
    async fn fetch(&self) -> Result<Option<ContentsResponse>, StoreError> {
        let response = self
            .client
            .get(self.contents_url())
            .query(&[("ref", self.config.branch.as_str())])
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(error_for_status(status, response.text().await.unwrap_or_default()));
        }
        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl PromptStore for GitHubStore {
    async fn load(&self) -> Result<Loaded, StoreError> {
        let mut observed = self.observed.lock().await;
        let Some(file) = self.fetch().await? else {
            warn!(
                repo = %self.config.full_name(),
                branch = %self.config.branch,
                path = %self.config.path,
                "remote prompt file not found; first save will create it"
            );
            *observed = Observed::Absent;
            return Ok(Loaded::Missing);
        };

        let raw = decode_content(&file)?;
        let records = decode_document(&raw)?;
        debug!(sha = %file.sha, count = records.len(), "loaded remote prompt file");
        *observed = Observed::Sha(file.sha);
        Ok(Loaded::Records(records))
    }

    async fn save(&self, records: &[PromptRecord]) -> Result<(), StoreError> {
        let document = encode_document(records)?;
        let mut observed = self.observed.lock().await;

        let current = self.fetch().await?.map(|f| f.sha);
        match (&*observed, current.as_deref()) {
            (Observed::Sha(seen), Some(now)) if seen != now => {
                warn!(seen = %seen, now = %now, "remote prompt file changed since last read");
                return Err(StoreError::Conflict(format!(
                    "{} was changed by another writer; reload before saving",
                    self.config.path
                )));
            }
            (Observed::Absent, Some(_)) => {
                warn!("remote prompt file appeared since last read");
                return Err(StoreError::Conflict(format!(
                    "{} was created by another writer; reload before saving",
                    self.config.path
                )));
            }
            _ => {}
        }

        let body = PutContentsRequest {
            message: format!("Update {} ({} prompts)", self.config.path, records.len()),
            content: BASE64.encode(document.as_bytes()),
            branch: &self.config.branch,
            sha: current.as_deref(),
        };

        let response = self
            .client
            .put(self.contents_url())
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let err = error_for_status(status, response.text().await.unwrap_or_default());
            warn!(%status, error = %err, "remote prompt file write failed");
            return Err(err);
        }

        let written: PutContentsResponse = response.json().await?;
        info!(
            repo = %self.config.full_name(),
            created = current.is_none(),
            sha = %written.content.sha,
            count = records.len(),
            "committed remote prompt file"
        );
        *observed = Observed::Sha(written.content.sha);
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "github {}:{}/{}",
            self.config.full_name(),
            self.config.branch,
            self.config.path
        )
    }
}

fn decode_content(file: &ContentsResponse) -> Result<String, StoreError> {
    if file.encoding != "base64" {
        return Err(StoreError::Decode(format!(
            "unsupported content encoding '{}'",
            file.encoding
        )));
    }
    // GitHub wraps the base64 payload at 60 columns.
    let compact: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

fn error_for_status(status: StatusCode, body: String) -> StoreError {
    let message = serde_json::from_str::<GitHubErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => StoreError::Conflict(message),
        _ => StoreError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fake_github::FakeGitHub;

    fn record(title: &str) -> PromptRecord {
        PromptRecord {
            title: title.to_string(),
            category: "Technology".to_string(),
            description: "popis".to_string(),
            text: format!("do {title}"),
            tags: vec!["žluťoučký".to_string()],
            created_date: "01.03.2025".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_remote_file_loads_as_missing() {
        let fake = FakeGitHub::start().await;
        let store = GitHubStore::new(fake.config()).unwrap();
        assert_eq!(store.load().await.unwrap(), Loaded::Missing);
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let fake = FakeGitHub::start().await;
        let store = GitHubStore::new(fake.config()).unwrap();
        store.load().await.unwrap();

        store.save(&[record("A")]).await.unwrap();
        let after_create = fake.snapshot().await;
        assert_eq!(after_create.puts_without_sha, 1);

        store.save(&[record("A"), record("B")]).await.unwrap();
        let after_update = fake.snapshot().await;
        assert_eq!(after_update.puts_with_sha, 1);

        let loaded = GitHubStore::new(fake.config())
            .unwrap()
            .load()
            .await
            .unwrap()
            .into_records();
        assert_eq!(loaded, vec![record("A"), record("B")]);
    }

    #[tokio::test]
    async fn test_saved_content_is_pretty_utf8_document() {
        let fake = FakeGitHub::start().await;
        let store = GitHubStore::new(fake.config()).unwrap();
        store.save(&[record("A")]).await.unwrap();

        let stored = fake.snapshot().await.document.unwrap();
        assert_eq!(stored, encode_document(&[record("A")]).unwrap());
        assert!(stored.contains("žluťoučký"));
        assert!(stored.contains("\n  {\n    \"nazev\""));
    }

    #[tokio::test]
    async fn test_stale_sha_is_a_conflict_and_remote_untouched() {
        let fake = FakeGitHub::start().await;
        fake.seed(&encode_document(&[record("A")]).unwrap()).await;

        let store = GitHubStore::new(fake.config()).unwrap();
        store.load().await.unwrap();

        // Another session commits in between.
        let other = encode_document(&[record("A"), record("Other")]).unwrap();
        fake.seed(&other).await;

        let err = store.save(&[record("A"), record("Mine")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(fake.snapshot().await.document.as_deref(), Some(other.as_str()));
    }

    #[tokio::test]
    async fn test_remote_sha_mismatch_reported_as_conflict() {
        let fake = FakeGitHub::start().await;
        fake.seed(&encode_document(&[record("A")]).unwrap()).await;
        fake.reject_puts_with(409).await;

        let store = GitHubStore::new(fake.config()).unwrap();
        store.load().await.unwrap();
        let err = store.save(&[record("B")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_file_created_elsewhere_after_empty_load_is_conflict() {
        let fake = FakeGitHub::start().await;
        let store = GitHubStore::new(fake.config()).unwrap();
        store.load().await.unwrap();

        fake.seed(&encode_document(&[record("Theirs")]).unwrap()).await;
        let err = store.save(&[record("Mine")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_bad_token_is_unauthorized() {
        let fake = FakeGitHub::start().await;
        let mut config = fake.config();
        config.token = "wrong".to_string();
        let store = GitHubStore::new(config).unwrap();
        assert!(matches!(
            store.load().await,
            Err(StoreError::Unauthorized { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_round_trip_keeps_remote_document_identical() {
        let fake = FakeGitHub::start().await;
        let original = encode_document(&[record("A"), record("B")]).unwrap();
        fake.seed(&original).await;

        let store = GitHubStore::new(fake.config()).unwrap();
        let records = store.load().await.unwrap().into_records();
        store.save(&records).await.unwrap();

        assert_eq!(fake.snapshot().await.document.as_deref(), Some(original.as_str()));
    }

    #[test]
    fn test_decode_content_handles_wrapped_base64() {
        let encoded = BASE64.encode("[{\"nazev\":\"X\",\"text\":\"y\"}]");
        let wrapped = format!("{}\n{}\n", &encoded[..10], &encoded[10..]);
        let file = ContentsResponse {
            sha: "abc".to_string(),
            content: wrapped,
            encoding: "base64".to_string(),
        };
        assert_eq!(decode_content(&file).unwrap(), "[{\"nazev\":\"X\",\"text\":\"y\"}]");
    }

    #[test]
    fn test_decode_content_rejects_other_encodings() {
        let file = ContentsResponse {
            sha: "abc".to_string(),
            content: String::new(),
            encoding: "none".to_string(),
        };
        assert!(matches!(decode_content(&file), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, r#"{"message":"Resource not accessible"}"#.into()),
            StoreError::Unauthorized { status: 403, ref message } if message == "Resource not accessible"
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNPROCESSABLE_ENTITY, "sha wasn't supplied".into()),
            StoreError::Conflict(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, String::new()),
            StoreError::Api { status: 502, .. }
        ));
    }
}
