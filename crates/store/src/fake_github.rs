//! In-process stand-in for the GitHub Contents API used by tests.
//!
//! Implements the subset the backend relies on: file and directory GET,
//! PUT with sha checking, DELETE with sha checking, and bearer auth.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use villa_site_core::GitHubConfig;

const TOKEN: &str = "test-token";

#[derive(Default)]
struct FakeState {
    files: BTreeMap<String, (Vec<u8>, String)>,
    messages: Vec<String>,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeGitHub {
    addr: SocketAddr,
    state: Shared,
}

#[derive(Deserialize)]
struct PutBody {
    message: String,
    content: String,
    #[serde(default)]
    sha: Option<String>,
}

#[derive(Deserialize)]
struct DeleteBody {
    message: String,
    sha: String,
}

impl FakeGitHub {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route(
                "/repos/{owner}/{repo}/contents/{*path}",
                get(get_contents).put(put_contents).delete(delete_contents),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn config(&self) -> GitHubConfig {
        GitHubConfig {
            token: TOKEN.to_string(),
            owner: "acme".to_string(),
            repo: "villa".to_string(),
            branch: "main".to_string(),
            api_url: format!("http://{}", self.addr),
        }
    }

    pub fn last_message(&self) -> Option<String> {
        self.state.lock().unwrap().messages.last().cloned()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|(bytes, _)| bytes.clone())
    }
}

fn sha_of(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn file_json(path: &str, bytes: &[u8], sha: &str) -> Value {
    // GitHub wraps base64 content at 60 columns
    let encoded = BASE64.encode(bytes);
    let wrapped = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    json!({
        "type": "file",
        "name": path.rsplit('/').next().unwrap_or(path),
        "path": path,
        "sha": sha,
        "size": bytes.len(),
        "content": wrapped,
        "encoding": "base64",
        "download_url": null,
    })
}

async fn get_contents(
    State(state): State<Shared>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let state = state.lock().unwrap();
    if let Some((bytes, sha)) = state.files.get(&path) {
        return Json(file_json(&path, bytes, sha)).into_response();
    }

    let prefix = format!("{}/", path.trim_end_matches('/'));
    let mut dirs = BTreeSet::new();
    let mut entries = Vec::new();
    for (file_path, (bytes, sha)) in &state.files {
        let Some(rest) = file_path.strip_prefix(&prefix) else {
            continue;
        };
        match rest.split_once('/') {
            Some((dir, _)) => {
                dirs.insert(dir.to_string());
            }
            None => entries.push(json!({
                "type": "file",
                "name": rest,
                "path": file_path,
                "sha": sha,
                "size": bytes.len(),
            })),
        }
    }
    for dir in dirs {
        entries.push(json!({
            "type": "dir",
            "name": dir,
            "path": format!("{}{}", prefix, dir),
            "sha": sha_of(dir.as_bytes()),
            "size": 0,
        }));
    }

    if entries.is_empty() {
        return error(StatusCode::NOT_FOUND, "Not Found");
    }
    Json(Value::Array(entries)).into_response()
}

async fn put_contents(
    State(state): State<Shared>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<PutBody>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let Ok(bytes) = BASE64.decode(&body.content) else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "content is not valid Base64");
    };

    let mut state = state.lock().unwrap();
    let current = state.files.get(&path).map(|(_, sha)| sha.clone());
    let status = match (current, body.sha) {
        (None, None) => StatusCode::CREATED,
        (Some(current), Some(sha)) if current == sha => StatusCode::OK,
        (Some(_), None) => {
            return error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid request.\n\n\"sha\" wasn't supplied.",
            );
        }
        (_, Some(sha)) => {
            return error(
                StatusCode::CONFLICT,
                &format!("{} does not match {}", path, sha),
            );
        }
    };

    let sha = sha_of(&bytes);
    state.files.insert(path.clone(), (bytes.clone(), sha.clone()));
    state.messages.push(body.message);
    (
        status,
        Json(json!({ "content": file_json(&path, &bytes, &sha), "commit": {} })),
    )
        .into_response()
}

async fn delete_contents(
    State(state): State<Shared>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<DeleteBody>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let mut state = state.lock().unwrap();
    match state.files.get(&path) {
        None => error(StatusCode::NOT_FOUND, "Not Found"),
        Some((_, sha)) if *sha != body.sha => error(
            StatusCode::CONFLICT,
            &format!("{} does not match {}", path, body.sha),
        ),
        Some(_) => {
            state.files.remove(&path);
            state.messages.push(body.message);
            Json(json!({ "content": null, "commit": {} })).into_response()
        }
    }
}
