// GitHub Contents API client
//
// Reads return the blob SHA as version token; writes and deletes send it back
// and GitHub refuses them when the file moved on in the meantime.

use crate::backend::{ContentBackend, DirEntry, StoredFile, VersionToken};
use crate::error::StoreError;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use villa_site_core::{EntryType, GitHubConfig};

const API_VERSION: &str = "2022-11-28";

/// GitHub Contents API backend
pub struct GitHubBackend {
    client: reqwest::Client,
    api_url: Url,
    owner: String,
    repo: String,
    branch: String,
}

/// File or directory entry as returned by the Contents API
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

/// A path answers with an object for files and an array for directories
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<ContentsEntry>),
    File(Box<ContentsEntry>),
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubBackend {
    /// Create new GitHub API client
    pub fn new(config: &GitHubConfig, timeout: Duration) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|_| StoreError::Unavailable("GitHub token is not a valid header".into()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("villa-site"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let api_url = Url::parse(&config.api_url).map_err(|e| {
            StoreError::Unavailable(format!("Invalid GitHub API URL '{}': {}", config.api_url, e))
        })?;

        Ok(Self {
            client,
            api_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
        })
    }

    /// `{api}/repos/{owner}/{repo}/contents/{path}` with every segment encoded
    fn contents_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("GitHub API URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    async fn get_contents(&self, path: &str) -> Result<Option<ContentsResponse>, StoreError> {
        let url = self.contents_url(path)?;
        let response = self
            .client
            .get(url)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await
            .map_err(unavailable)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, path).await?;
        let body = response
            .json::<ContentsResponse>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(Some(body))
    }

    /// Contents of a file entry. Files over 1 MB come back without inline
    /// content and are fetched through `download_url`.
    async fn file_bytes(&self, entry: &ContentsEntry) -> Result<Vec<u8>, StoreError> {
        match (entry.encoding.as_deref(), entry.content.as_deref()) {
            (Some("base64"), Some(content)) if !content.is_empty() => {
                let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
                BASE64
                    .decode(compact)
                    .map_err(|e| StoreError::Malformed(format!("{}: {}", entry.path, e)))
            }
            _ => match &entry.download_url {
                Some(url) => {
                    let response = self.client.get(url).send().await.map_err(unavailable)?;
                    let response = check_status(response, &entry.path).await?;
                    let bytes = response.bytes().await.map_err(unavailable)?;
                    Ok(bytes.to_vec())
                }
                None if entry.size == 0 => Ok(Vec::new()),
                None => Err(StoreError::Malformed(format!(
                    "{} has no inline content or download URL",
                    entry.path
                ))),
            },
        }
    }
}

#[async_trait]
impl ContentBackend for GitHubBackend {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        match self.get_contents(path).await? {
            None => Ok(None),
            Some(ContentsResponse::File(entry)) => {
                let content = self.file_bytes(&entry).await?;
                Ok(Some(StoredFile {
                    content,
                    version: VersionToken::new(entry.sha),
                }))
            }
            Some(ContentsResponse::Directory(_)) => {
                Err(StoreError::InvalidPath(format!("{} is a directory", path)))
            }
        }
    }

    async fn write(
        &self,
        path: &str,
        content: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, StoreError> {
        let url = self.contents_url(path)?;
        let request = PutRequest {
            message,
            content: BASE64.encode(content),
            branch: &self.branch,
            sha: expected.map(|t| t.as_str()),
        };

        let response = self
            .client
            .put(url)
            .json(&request)
            .send()
            .await
            .map_err(unavailable)?;
        let response = check_status(response, path).await?;
        let body = response
            .json::<PutResponse>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(VersionToken::new(body.content.sha))
    }

    async fn delete(
        &self,
        path: &str,
        expected: &VersionToken,
        message: &str,
    ) -> Result<(), StoreError> {
        let url = self.contents_url(path)?;
        let request = DeleteRequest {
            message,
            sha: expected.as_str(),
            branch: &self.branch,
        };

        let response = self
            .client
            .delete(url)
            .json(&request)
            .send()
            .await
            .map_err(unavailable)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        check_status(response, path).await?;
        Ok(())
    }

    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError> {
        let entries = match self.get_contents(dir).await? {
            None => {
                return Err(StoreError::NotFound {
                    path: dir.to_string(),
                });
            }
            Some(ContentsResponse::File(_)) => {
                return Err(StoreError::InvalidPath(format!("{} is not a directory", dir)));
            }
            Some(ContentsResponse::Directory(entries)) => entries,
        };

        let mut listing: Vec<DirEntry> = entries
            .into_iter()
            .filter_map(|e| {
                let entry_type = match e.entry_type.as_str() {
                    "file" => EntryType::File,
                    "dir" => EntryType::Dir,
                    // symlinks and submodules are not content
                    _ => return None,
                };
                Some(DirEntry {
                    name: e.name,
                    path: e.path,
                    version: VersionToken::new(e.sha),
                    size: e.size,
                    entry_type,
                })
            })
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }
}

fn unavailable(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Pass through success responses, map everything else to a store error
/// carrying GitHub's own message
async fn check_status(response: Response, path: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text
            }
        });

    // 409: sha does not match; 422: sha missing for an existing file
    let is_conflict = status == StatusCode::CONFLICT
        || (status == StatusCode::UNPROCESSABLE_ENTITY && message.contains("sha"));
    if is_conflict {
        return Err(StoreError::Conflict {
            path: path.to_string(),
            message,
        });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound {
            path: path.to_string(),
        });
    }

    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_github::FakeGitHub;

    async fn backend() -> (FakeGitHub, GitHubBackend) {
        let fake = FakeGitHub::start().await;
        let backend = GitHubBackend::new(&fake.config(), Duration::from_secs(5)).unwrap();
        (fake, backend)
    }

    #[tokio::test]
    async fn test_contents_url_encodes_segments() {
        let (_fake, backend) = backend().await;
        let url = backend
            .contents_url("public/images/gallery/Exterior & Pool (3).jpg")
            .unwrap();
        assert!(url.path().ends_with(
            "/repos/acme/villa/contents/public/images/gallery/Exterior%20&%20Pool%20(3).jpg"
        ));
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let (_fake, backend) = backend().await;
        assert!(backend.read("content/home.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (fake, backend) = backend().await;
        let token = backend
            .write("content/home.json", b"{\"a\":1}\n", None, "create")
            .await
            .unwrap();

        let file = backend.read("content/home.json").await.unwrap().unwrap();
        assert_eq!(file.content, b"{\"a\":1}\n");
        assert_eq!(file.version, token);
        assert_eq!(fake.last_message().as_deref(), Some("create"));
    }

    #[tokio::test]
    async fn test_stale_sha_conflict_keeps_first_write() {
        let (_fake, backend) = backend().await;
        let base = backend.write("content/home.json", b"base", None, "m").await.unwrap();

        // Both sessions read the same token
        let token_a = backend.read("content/home.json").await.unwrap().unwrap().version;
        let token_b = token_a.clone();
        assert_eq!(token_a, base);

        backend
            .write("content/home.json", b"from A", Some(&token_a), "A")
            .await
            .unwrap();
        let err = backend
            .write("content/home.json", b"from B", Some(&token_b), "B")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let file = backend.read("content/home.json").await.unwrap().unwrap();
        assert_eq!(file.content, b"from A");
    }

    #[tokio::test]
    async fn test_overwrite_without_sha_is_conflict() {
        let (_fake, backend) = backend().await;
        backend.write("a.json", b"1", None, "m").await.unwrap();
        let err = backend.write("a.json", b"2", None, "m").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_by_token() {
        let (_fake, backend) = backend().await;
        let v1 = backend.write("public/images/a.jpg", b"1", None, "m").await.unwrap();
        let v2 = backend
            .write("public/images/a.jpg", b"2", Some(&v1), "m")
            .await
            .unwrap();

        let err = backend.delete("public/images/a.jpg", &v1, "m").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        backend.delete("public/images/a.jpg", &v2, "m").await.unwrap();
        let err = backend.delete("public/images/a.jpg", &v2, "m").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_directory() {
        let (_fake, backend) = backend().await;
        backend.write("public/images/gallery/b.jpg", b"bb", None, "m").await.unwrap();
        backend.write("public/images/gallery/a.jpg", b"a", None, "m").await.unwrap();
        backend.write("public/images/gallery/sub/c.jpg", b"c", None, "m").await.unwrap();

        let entries = backend.list("public/images/gallery").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "sub"]);
        assert_eq!(entries[1].size, 2);
        assert_eq!(entries[1].path, "public/images/gallery/b.jpg");
        assert_eq!(entries[2].entry_type, EntryType::Dir);

        let err = backend.list("public/missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_bad_credential_rejected_with_message() {
        let fake = FakeGitHub::start().await;
        let mut config = fake.config();
        config.token = "wrong".to_string();
        let backend = GitHubBackend::new(&config, Duration::from_secs(5)).unwrap();

        let err = backend.read("content/home.json").await.unwrap_err();
        match err {
            StoreError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_api_is_unavailable() {
        let fake = FakeGitHub::start().await;
        let mut config = fake.config();
        // Nothing listens on port 9 locally
        config.api_url = "http://127.0.0.1:9".to_string();
        let backend = GitHubBackend::new(&config, Duration::from_secs(2)).unwrap();

        let err = backend.list("public/images").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
