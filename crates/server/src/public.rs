use crate::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::warn;
use villa_site_core::{GlobalContent, PageContent};
use villa_site_gallery::{GalleryListing, GalleryMeta, build_listing};
use villa_site_generator::articles::{is_valid_slug, load_articles};
use villa_site_generator::{
    Article, render_article_index, render_article_page, render_landing_page, render_not_found,
};

/// Current gallery, empty when the folder cannot be listed
pub async fn gallery_listing(state: &AppState) -> GalleryListing {
    let records = match state.service.list_images(None).await {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Gallery listing unavailable");
            return GalleryListing::default();
        }
    };
    let meta = GalleryMeta::from_value(&state.service.get_gallery_meta().await);
    build_listing(&records, &meta)
}

/// Documents and articles read from the local tree
#[derive(Default)]
struct LocalContent {
    global: Option<GlobalContent>,
    page: Option<PageContent>,
    articles: Vec<Article>,
}

/// The accessor reads with blocking IO, so it runs on the blocking pool
async fn local_content(state: &AppState) -> LocalContent {
    let accessor = state.accessor.clone();
    let task = tokio::task::spawn_blocking(move || LocalContent {
        global: accessor.get_global_data(),
        page: accessor.get_page_data(),
        articles: load_articles(&accessor.root().join(accessor.layout().articles_dir())),
    });
    match task.await {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "Reading site content failed");
            LocalContent::default()
        }
    }
}

pub async fn gallery(State(state): State<AppState>) -> Json<GalleryListing> {
    Json(gallery_listing(&state).await)
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let gallery = gallery_listing(&state).await;
    let content = local_content(&state).await;
    Html(render_landing_page(
        content.global.as_ref(),
        content.page.as_ref(),
        &gallery,
        &content.articles,
    ))
}

pub async fn article_index(State(state): State<AppState>) -> Html<String> {
    let content = local_content(&state).await;
    Html(render_article_index(content.global.as_ref(), &content.articles))
}

pub async fn article(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let content = local_content(&state).await;
    let global = content.global.as_ref();
    let found = is_valid_slug(&slug)
        .then(|| content.articles.iter().find(|a| a.slug == slug))
        .flatten();
    match found {
        Some(article) => Html(render_article_page(global, article)).into_response(),
        None => (StatusCode::NOT_FOUND, Html(render_not_found(global))).into_response(),
    }
}
