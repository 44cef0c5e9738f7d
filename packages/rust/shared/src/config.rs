//! Application configuration for aidata.
//!
//! Config is read from `./aidata.toml` when present, else from
//! `~/.aidata/aidata.toml`, else defaults are used.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AiDataError, Result};
use crate::types::Category;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "aidata.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".aidata";

// ---------------------------------------------------------------------------
// Config structs (matching aidata.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// The organization the content describes.
    #[serde(default)]
    pub site: SiteConfig,

    /// Where generated artifacts are published.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Output location and behavior.
    #[serde(default)]
    pub output: OutputConfig,

    /// Section heading overrides, keyed by category key (e.g. `service = "Construction"`).
    #[serde(default)]
    pub headings: BTreeMap<String, String>,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Organization name.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Organization home page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// One-line description, used as the knowledge file summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// schema.org type for the organization (e.g. `GeneralContractor`, `LocalBusiness`).
    #[serde(default = "default_organization_type")]
    pub organization_type: String,

    /// Logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,

    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            url: None,
            description: None,
            organization_type: default_organization_type(),
            logo: None,
            telephone: None,
            email: None,
        }
    }
}

fn default_site_name() -> String {
    "Site".into()
}
fn default_organization_type() -> String {
    "GeneralContractor".into()
}

/// `[publish]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Base URL every canonical artifact URL is built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_base_url: Option<String>,

    /// GitHub `owner/repo` hosting the artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Branch raw URLs point at.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Explicit raw-content base URL (overrides the repository-derived one).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_base_url: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            canonical_base_url: None,
            repository: None,
            branch: default_branch(),
            raw_base_url: None,
        }
    }
}

fn default_branch() -> String {
    "main".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output root directory.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Delete previously generated `schemas/` and `docs/` before writing.
    #[serde(default)]
    pub clean: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            clean: false,
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}

impl AppConfig {
    /// Section heading for a category, honoring `[headings]` overrides.
    pub fn heading_for(&self, category: Category) -> String {
        self.headings
            .get(category.key())
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .unwrap_or(category.default_heading())
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Link bases (runtime, resolved from [publish])
// ---------------------------------------------------------------------------

/// Resolved base URLs for canonical and raw artifact links (no trailing slash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBases {
    pub canonical: String,
    pub raw: String,
}

impl LinkBases {
    /// Canonical URL of an artifact path relative to the output root.
    pub fn canonical_url(&self, artifact_path: &str) -> String {
        format!("{}/{}", self.canonical, artifact_path.trim_start_matches('/'))
    }

    /// Raw-content URL of an artifact path relative to the output root.
    pub fn raw_url(&self, artifact_path: &str) -> String {
        format!("{}/{}", self.raw, artifact_path.trim_start_matches('/'))
    }

    /// Map a canonical URL back to its artifact path, if it lives under the canonical base.
    pub fn artifact_path_of(&self, canonical_url: &str) -> Option<String> {
        let rest = canonical_url.strip_prefix(&self.canonical)?;
        let path = rest.strip_prefix('/')?;
        if path.is_empty() {
            return None;
        }
        Some(path.to_string())
    }
}

impl TryFrom<&PublishConfig> for LinkBases {
    type Error = AiDataError;

    /// Resolve link bases.
    ///
    /// Canonical: `canonical_base_url`, else the GitHub Pages address of
    /// `repository`. Raw: `raw_base_url`, else
    /// `raw.githubusercontent.com/<repository>/<branch>`, else the canonical base.
    fn try_from(publish: &PublishConfig) -> Result<Self> {
        let repository = publish
            .repository
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());

        if let Some(repo) = repository {
            if repo.split('/').filter(|p| !p.is_empty()).count() != 2 {
                return Err(AiDataError::config(format!(
                    "repository '{repo}' must look like 'owner/name'"
                )));
            }
        }

        let canonical = match (publish.canonical_base_url.as_deref(), repository) {
            (Some(base), _) => normalize_base(base)?,
            (None, Some(repo)) => {
                let (owner, name) = repo.split_once('/').unwrap_or((repo, ""));
                normalize_base(&format!(
                    "https://{}.github.io/{}",
                    owner.to_lowercase(),
                    name.trim_matches('/')
                ))?
            }
            (None, None) => {
                return Err(AiDataError::config(
                    "no canonical base URL: set [publish].canonical_base_url or a repository",
                ));
            }
        };

        let raw = match (publish.raw_base_url.as_deref(), repository) {
            (Some(base), _) => normalize_base(base)?,
            (None, Some(repo)) => normalize_base(&format!(
                "https://raw.githubusercontent.com/{}/{}",
                repo.trim_matches('/'),
                publish.branch
            ))?,
            (None, None) => canonical.clone(),
        };

        Ok(Self { canonical, raw })
    }
}

/// Validate an absolute http(s) URL and strip any trailing slash.
fn normalize_base(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| AiDataError::config(format!("invalid base URL '{raw}': {e}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AiDataError::config(format!(
            "base URL '{raw}' must use http or https"
        )));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.aidata/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AiDataError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.aidata/aidata.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load config from `./aidata.toml`, then the user config file.
/// Returns defaults if neither exists.
pub fn load_config() -> Result<AppConfig> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    let path = config_file_path()?;
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AiDataError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AiDataError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the user config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| AiDataError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| AiDataError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| AiDataError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}
