//! `/api/admin` handlers. Every mutating call carries the admin password in
//! its body; reads are open.
//!
//! `GET /content` returns the document's version token as its `ETag`. A save
//! that sends it back as `sha` only lands on that revision.

use crate::AppState;
use crate::error::ApiError;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, header},
};
use serde::Deserialize;
use serde_json::{Value, json};
use villa_site_core::GalleryImageRecord;
use villa_site_store::{ContentError, VersionToken};

#[derive(Deserialize)]
pub struct DocQuery {
    doc: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveContentRequest {
    doc: String,
    content: Value,
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct FolderQuery {
    path: Option<String>,
}

#[derive(Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    path: Option<String>,
    filename: String,
    content: String,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    file_path: String,
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveMetaRequest {
    meta: Value,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    password: Option<String>,
}

pub async fn get_content(
    State(state): State<AppState>,
    query: Result<Query<DocQuery>, QueryRejection>,
) -> Result<(HeaderMap, Json<Value>), ApiError> {
    let Query(query) = query?;
    let doc = query
        .doc
        .ok_or_else(|| ContentError::InvalidRequest("Missing 'doc' parameter".to_string()))?;
    let (content, version) = state.service.load_content(&doc).await?;

    let mut headers = HeaderMap::new();
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", version)) {
        headers.insert(header::ETAG, etag);
    }
    Ok((headers, Json(content)))
}

pub async fn save_content(
    State(state): State<AppState>,
    body: Result<Json<SaveContentRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let expected = req.sha.map(VersionToken::new);
    let saved = state
        .service
        .save_content(
            &req.doc,
            &req.content,
            expected.as_ref(),
            req.password.as_deref(),
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": saved.message,
        "sha": saved.version,
    })))
}

pub async fn list_images(
    State(state): State<AppState>,
    query: Result<Query<FolderQuery>, QueryRejection>,
) -> Result<Json<Vec<GalleryImageRecord>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.service.list_images(query.path.as_deref()).await?))
}

pub async fn upload_image(
    State(state): State<AppState>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let path = state
        .service
        .upload_image(
            req.path.as_deref(),
            &req.filename,
            &req.content,
            req.password.as_deref(),
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Uploaded {}", path),
        "path": path,
    })))
}

pub async fn delete_image(
    State(state): State<AppState>,
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let expected = req.sha.map(VersionToken::new);
    let message = state
        .service
        .delete_image(&req.file_path, expected.as_ref(), req.password.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "message": message })))
}

pub async fn get_gallery_meta(State(state): State<AppState>) -> Json<Value> {
    Json(state.service.get_gallery_meta().await)
}

pub async fn save_gallery_meta(
    State(state): State<AppState>,
    body: Result<Json<SaveMetaRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    let message = state
        .service
        .save_gallery_meta(&req.meta, req.password.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "message": message })))
}

pub async fn check_auth(
    State(state): State<AppState>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = body?;
    state.service.check_password(req.password.as_deref())?;
    Ok(Json(json!({ "success": true })))
}
