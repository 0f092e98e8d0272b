use crate::error::{Error, Result};
use crate::types::DocumentKind;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "site.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_PUBLIC_ROOT: &str = "public";
const DEFAULT_GALLERY_FOLDER: &str = "images/gallery";
const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly; every table is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    content: RawContent,
    #[serde(default)]
    github: RawGitHub,
    #[serde(default)]
    http: RawHttp,
    #[serde(default)]
    site: RawSite,
}

#[derive(Debug, Default, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    dir: Option<String>,
    public_root: Option<String>,
    gallery_folder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGitHub {
    repo: Option<String>,
    branch: Option<String>,
    api_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHttp {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSite {
    url: Option<String>,
}

/// Process-wide settings, resolved once at start from site.toml and the
/// environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Site root; every repository path below is relative to it
    pub root: PathBuf,
    pub server: ServerConfig,
    pub content: ContentLayout,
    /// Present only when a GitHub write credential is configured
    pub github: Option<GitHubConfig>,
    pub admin_password: Option<String>,
    pub site_url: Option<String>,
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub api_url: String,
}

/// Fixed repository paths of the content documents and image tree.
///
/// Paths are `/`-separated and relative to the site root, so the same value
/// addresses a file on disk and a file in the remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLayout {
    pub content_dir: String,
    pub public_root: String,
    pub gallery_folder: String,
}

impl Default for ContentLayout {
    fn default() -> Self {
        Self {
            content_dir: DEFAULT_CONTENT_DIR.to_string(),
            public_root: DEFAULT_PUBLIC_ROOT.to_string(),
            gallery_folder: DEFAULT_GALLERY_FOLDER.to_string(),
        }
    }
}

impl ContentLayout {
    pub fn document_path(&self, kind: DocumentKind) -> String {
        let file = match kind {
            DocumentKind::Global => "global.json",
            DocumentKind::Page => "home.json",
        };
        format!("{}/{}", self.content_dir, file)
    }

    pub fn gallery_meta_path(&self) -> String {
        format!("{}/gallery-meta.json", self.content_dir)
    }

    pub fn articles_dir(&self) -> String {
        format!("{}/articles", self.content_dir)
    }

    /// Repository path of a folder under the public root
    pub fn public_path(&self, relative: &str) -> String {
        let relative = relative.trim_matches('/');
        if relative.is_empty() {
            self.public_root.clone()
        } else {
            format!("{}/{}", self.public_root, relative)
        }
    }

    /// Convert a repository path under the public root into its public URL.
    /// Paths outside the public root are returned with a leading slash only.
    pub fn public_url(&self, repo_path: &str) -> String {
        let prefix = format!("{}/", self.public_root);
        match repo_path.strip_prefix(&prefix) {
            Some(rest) => format!("/{}", rest),
            None => format!("/{}", repo_path.trim_start_matches('/')),
        }
    }
}

/// Load settings for the site rooted at `root`, reading `site.toml` if it
/// exists and applying environment overrides.
pub fn load_settings<P: AsRef<Path>>(root: P) -> Result<Settings> {
    let root = root.as_ref();
    let config_path = root.join(CONFIG_FILE);
    let content = if config_path.exists() {
        Some(fs::read_to_string(&config_path)?)
    } else {
        None
    };
    resolve_settings(root, content.as_deref(), |key| std::env::var(key).ok())
}

/// Resolve settings from an optional site.toml body and an environment lookup
/// (useful for testing)
pub fn resolve_settings<F>(root: &Path, toml_content: Option<&str>, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let raw: RawConfig = match toml_content {
        Some(content) => toml::from_str(content)?,
        None => RawConfig::default(),
    };
    // Empty variables count as unset
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let content_dir = raw
        .content
        .dir
        .unwrap_or_else(|| DEFAULT_CONTENT_DIR.to_string());
    let public_root = raw
        .content
        .public_root
        .unwrap_or_else(|| DEFAULT_PUBLIC_ROOT.to_string());
    let gallery_folder = raw
        .content
        .gallery_folder
        .unwrap_or_else(|| DEFAULT_GALLERY_FOLDER.to_string());

    let content = ContentLayout {
        content_dir: normalize(&validate_path(&content_dir, "content.dir")?),
        public_root: normalize(&validate_path(&public_root, "content.public_root")?),
        gallery_folder: normalize(&validate_path(&gallery_folder, "content.gallery_folder")?),
    };

    let github = match env("GITHUB_TOKEN") {
        Some(token) => {
            let repo = env("GITHUB_REPO").or(raw.github.repo).ok_or_else(|| {
                Error::ConfigParse(
                    "GITHUB_REPO (or [github].repo) must be set when GITHUB_TOKEN is present"
                        .to_string(),
                )
            })?;
            let (owner, name) = parse_repo(&repo)?;
            Some(GitHubConfig {
                token,
                owner,
                repo: name,
                branch: env("GITHUB_BRANCH")
                    .or(raw.github.branch)
                    .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                api_url: env("GITHUB_API_URL")
                    .or(raw.github.api_url)
                    .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            })
        }
        None => None,
    };

    Ok(Settings {
        root: root.to_path_buf(),
        server: ServerConfig {
            host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: raw.server.port.unwrap_or(DEFAULT_PORT),
        },
        content,
        github,
        admin_password: env("ADMIN_PASSWORD"),
        site_url: env("SITE_URL").or(raw.site.url),
        http_timeout: Duration::from_secs(
            raw.http.timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        ),
    })
}

/// Split `owner/name` into its two parts
fn parse_repo(repo: &str) -> Result<(String, String)> {
    match repo.trim().split_once('/') {
        Some((owner, name))
            if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
        {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(Error::ConfigParse(format!(
            "Invalid GitHub repository '{}', expected 'owner/name'",
            repo
        ))),
    }
}

/// Validate and convert a path string to PathBuf.
///
/// This function prevents path traversal by rejecting:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// It guards both site.toml values and folder/file names that arrive in
/// admin requests.
///
/// # Examples
///
/// ```text
/// validate_path("images/gallery", "path")      → Ok(PathBuf)
/// validate_path("/etc/passwd", "path")         → Err("Absolute paths not allowed...")
/// validate_path("../../etc/passwd", "path")    → Err("Parent directory references...")
/// ```
pub fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path.is_absolute() || path_str.starts_with('/') || path_str.starts_with('\\') {
        return Err(Error::InvalidPath(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == Component::ParentDir {
            return Err(Error::InvalidPath(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::InvalidPath(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}

/// Render a validated path with `/` separators and no `.` components
pub fn normalize(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
