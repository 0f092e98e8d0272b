//! HTTP client for the admin API.

use crate::error::EditorError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::ETAG;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use villa_site_core::{DocumentKind, GalleryImageRecord};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    sha: Option<String>,
}

/// A content document and the version token it was served with
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub content: Value,
    pub version: Option<String>,
}

/// Confirmation of a content save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub message: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base: Url,
}

impl AdminClient {
    /// `server` is the site origin, e.g. `http://127.0.0.1:8080`
    pub fn new(server: &str, timeout: Duration) -> Result<Self, EditorError> {
        let mut base = Url::parse(server).map_err(|e| EditorError::InvalidUrl(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let base = base
            .join("api/admin/")
            .map_err(|e| EditorError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("villa-site-editor")
            .build()?;
        Ok(Self { client, base })
    }

    fn url(&self, endpoint: &str) -> Result<Url, EditorError> {
        self.base
            .join(endpoint)
            .map_err(|e| EditorError::InvalidUrl(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, EditorError> {
        Ok(self.execute(request).await?.json().await?)
    }

    /// Send a request, turning a non-success status into [`EditorError::Api`]
    async fn execute(&self, request: RequestBuilder) -> Result<Response, EditorError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        Err(EditorError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn check_password(&self, password: &str) -> Result<(), EditorError> {
        let request = self
            .client
            .post(self.url("auth")?)
            .json(&json!({ "password": password }));
        self.send::<Value>(request).await.map(|_| ())
    }

    pub async fn get_content(&self, kind: DocumentKind) -> Result<Document, EditorError> {
        let request = self
            .client
            .get(self.url("content")?)
            .query(&[("doc", kind.as_str())]);
        let response = self.execute(request).await?;
        let version = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim_start_matches("W/").trim_matches('"').to_string());
        Ok(Document {
            content: response.json().await?,
            version,
        })
    }

    /// Save a document over revision `version`; `None` for a document that
    /// was never stored
    pub async fn save_content(
        &self,
        kind: DocumentKind,
        content: &Value,
        version: Option<&str>,
        password: &str,
    ) -> Result<Saved, EditorError> {
        let request = self.client.put(self.url("content")?).json(&json!({
            "doc": kind.as_str(),
            "content": content,
            "sha": version,
            "password": password,
        }));
        let body: MessageBody = self.send(request).await?;
        Ok(Saved {
            message: body.message.unwrap_or_else(|| "Saved".to_string()),
            version: body.sha,
        })
    }

    pub async fn list_images(
        &self,
        folder: Option<&str>,
    ) -> Result<Vec<GalleryImageRecord>, EditorError> {
        let mut request = self.client.get(self.url("images")?);
        if let Some(folder) = folder {
            request = request.query(&[("path", folder)]);
        }
        self.send(request).await
    }

    /// Upload raw bytes; returns the public path
    pub async fn upload_image(
        &self,
        folder: Option<&str>,
        filename: &str,
        bytes: &[u8],
        password: &str,
    ) -> Result<String, EditorError> {
        let request = self.client.post(self.url("images")?).json(&json!({
            "path": folder,
            "filename": filename,
            "content": BASE64.encode(bytes),
            "password": password,
        }));
        let body: MessageBody = self.send(request).await?;
        Ok(body.path.unwrap_or_default())
    }

    /// Delete revision `sha` of the image at `file_path`
    pub async fn delete_image(
        &self,
        file_path: &str,
        sha: &str,
        password: &str,
    ) -> Result<String, EditorError> {
        let request = self.client.delete(self.url("images")?).json(&json!({
            "filePath": file_path,
            "sha": sha,
            "password": password,
        }));
        let body: MessageBody = self.send(request).await?;
        Ok(body.message.unwrap_or_else(|| "Deleted".to_string()))
    }

    pub async fn get_gallery_meta(&self) -> Result<Value, EditorError> {
        self.send(self.client.get(self.url("gallery-meta")?)).await
    }

    pub async fn save_gallery_meta(&self, meta: &Value, password: &str) -> Result<String, EditorError> {
        let request = self
            .client
            .post(self.url("gallery-meta")?)
            .json(&json!({ "meta": meta, "password": password }));
        let body: MessageBody = self.send(request).await?;
        Ok(body.message.unwrap_or_else(|| "Saved".to_string()))
    }
}
