use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use villa_site_core::load_settings;
use villa_site_generator::ContentAccessor;
use villa_site_server::AppState;
use villa_site_store::service_from_settings;

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

/// Serve the public site and the admin API for the site at `path`
pub async fn run(path: PathBuf, port: Option<u16>) -> Result<()> {
    init_logging();

    if !path.is_dir() {
        anyhow::bail!("Site directory does not exist: {}", path.display());
    }

    let mut settings = load_settings(&path).context("Failed to load site settings")?;
    if let Some(port) = port {
        settings.server.port = port;
    }

    let service = service_from_settings(&settings).context("Failed to set up content backend")?;
    if !service.auth().is_enabled() {
        tracing::warn!("ADMIN_PASSWORD is not set; admin writes are not protected");
    }
    let accessor = ContentAccessor::new(&settings.root, settings.content.clone());

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                settings.server.host, settings.server.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    info!(site = %settings.root.display(), "Site ready at http://{}", addr);
    villa_site_server::serve(AppState::new(service, accessor), listener)
        .await
        .context("Server error")?;

    Ok(())
}
