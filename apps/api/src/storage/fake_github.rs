//! In-process stand-in for the GitHub Contents API, for tests.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::github::GitHubStoreConfig;

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone, Default)]
pub struct FakeRepo {
    pub document: Option<String>,
    pub sha: Option<String>,
    pub revision: u32,
    pub puts_with_sha: u32,
    pub puts_without_sha: u32,
    pub reject_puts: Option<u16>,
}

impl FakeRepo {
    fn write(&mut self, document: &str) {
        self.revision += 1;
        self.document = Some(document.to_string());
        self.sha = Some(format!("sha-{}", self.revision));
    }
}

type Shared = Arc<Mutex<FakeRepo>>;

pub struct FakeGitHub {
    base_url: String,
    repo: Shared,
}

#[derive(Deserialize)]
struct PutBody {
    content: String,
    sha: Option<String>,
}

impl FakeGitHub {
    pub async fn start() -> Self {
        let repo: Shared = Arc::default();
        let app = Router::new()
            .route(
                "/repos/:owner/:repo/contents/*path",
                get(get_contents).put(put_contents),
            )
            .with_state(repo.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            repo,
        }
    }

    pub fn config(&self) -> GitHubStoreConfig {
        GitHubStoreConfig {
            token: TOKEN.to_string(),
            owner: "acme".to_string(),
            repo: "prompts".to_string(),
            path: "prompty.json".to_string(),
            branch: "main".to_string(),
            api_url: self.base_url.clone(),
        }
    }

    /// Writes a document directly, as another session would.
    pub async fn seed(&self, document: &str) {
        self.repo.lock().await.write(document);
    }

    pub async fn reject_puts_with(&self, status: u16) {
        self.repo.lock().await.reject_puts = Some(status);
    }

    pub async fn snapshot(&self) -> FakeRepo {
        self.repo.lock().await.clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

fn message(status: StatusCode, text: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": text })))
}

async fn get_contents(
    State(repo): State<Shared>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let repo = repo.lock().await;
    match (&repo.document, &repo.sha) {
        (Some(document), Some(sha)) => {
            let encoded = BASE64.encode(document.as_bytes());
            let wrapped = encoded
                .as_bytes()
                .chunks(60)
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect::<Vec<_>>()
                .join("\n");
            (
                StatusCode::OK,
                Json(json!({ "sha": sha, "content": wrapped, "encoding": "base64" })),
            )
        }
        _ => message(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn put_contents(
    State(repo): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<PutBody>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let mut repo = repo.lock().await;
    if let Some(status) = repo.reject_puts {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::CONFLICT);
        return message(status, "does not match");
    }
    match (&repo.sha, &body.sha) {
        (Some(current), Some(given)) if current != given => {
            return message(StatusCode::CONFLICT, "sha does not match");
        }
        (Some(_), None) => {
            return message(StatusCode::UNPROCESSABLE_ENTITY, "sha wasn't supplied");
        }
        _ => {}
    }

    let created = body.sha.is_none();
    if created {
        repo.puts_without_sha += 1;
    } else {
        repo.puts_with_sha += 1;
    }
    let Ok(bytes) = BASE64.decode(body.content.as_bytes()) else {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "content is not valid Base64");
    };
    repo.write(&String::from_utf8_lossy(&bytes));

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(json!({ "content": { "sha": repo.sha } })))
}
