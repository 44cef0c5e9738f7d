//! Link manifest: `index.json`, `links.md`, and `sitemap.xml`.
//!
//! Every written artifact gets one [`IndexEntry`] with its canonical and raw
//! URLs. The same entries are rendered three ways. [`verify_manifest`]
//! re-ingests `index.json` or `links.md` and checks each URL resolves to a
//! file under the output root.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use aidata_markdown::{RenderedDocument, inline_text};
use aidata_schema::SchemaArtifact;
use aidata_shared::{
    AiDataError, AppConfig, ArtifactKind, CURRENT_SCHEMA_VERSION, Category, IndexEntry,
    LinkBases, LinkManifest, Result,
};

use crate::assembler::{ArtifactMeta, sha256_hex};

pub const INDEX_JSON: &str = "index.json";
pub const LINKS_MD: &str = "links.md";
pub const SITEMAP_XML: &str = "sitemap.xml";

/// Heading in `links.md` for artifacts that span every category.
const COMBINED_HEADING: &str = "Knowledge Base";

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Index entry for a written schema artifact.
pub fn schema_entry(artifact: &SchemaArtifact, meta: &ArtifactMeta, bases: &LinkBases) -> IndexEntry {
    IndexEntry {
        artifact_path: meta.path.clone(),
        kind: ArtifactKind::Schema,
        category: Some(artifact.category),
        source_record_ids: vec![artifact.record_id.clone()],
        canonical_url: bases.canonical_url(&meta.path),
        raw_url: bases.raw_url(&meta.path),
        sha256: meta.sha256.clone(),
        size_bytes: meta.size_bytes,
    }
}

/// Index entry for a written markdown document.
pub fn document_entry(
    document: &RenderedDocument,
    meta: &ArtifactMeta,
    bases: &LinkBases,
) -> IndexEntry {
    IndexEntry {
        artifact_path: meta.path.clone(),
        kind: ArtifactKind::Document,
        category: document.category,
        source_record_ids: document.record_ids.clone(),
        canonical_url: bases.canonical_url(&meta.path),
        raw_url: bases.raw_url(&meta.path),
        sha256: meta.sha256.clone(),
        size_bytes: meta.size_bytes,
    }
}

/// Wrap entries in a manifest stamped with the current time.
pub fn build_manifest(site_name: &str, bases: &LinkBases, entries: Vec<IndexEntry>) -> LinkManifest {
    LinkManifest {
        schema_version: CURRENT_SCHEMA_VERSION,
        site_name: site_name.to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: Utc::now(),
        canonical_base_url: bases.canonical.clone(),
        raw_base_url: bases.raw.clone(),
        entries,
    }
}

// ---------------------------------------------------------------------------
// links.md
// ---------------------------------------------------------------------------

/// Render the manifest in llms.txt format, one `##` section per category.
pub fn render_links_md(manifest: &LinkManifest, config: &AppConfig) -> String {
    let site = inline_text(&manifest.site_name);
    let summary = config
        .site
        .description
        .as_deref()
        .map(inline_text)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Schema.org JSON-LD and markdown documents for {site}."));

    let mut out = format!("# {site} AI Data Index\n\n> {summary}\n");

    let groups = Category::DISPLAY_ORDER
        .iter()
        .map(|&c| (Some(c), inline_text(&config.heading_for(c))))
        .chain(std::iter::once((None, COMBINED_HEADING.to_string())));

    for (category, heading) in groups {
        let entries: Vec<&IndexEntry> = manifest
            .entries
            .iter()
            .filter(|e| e.category == category)
            .collect();
        if entries.is_empty() {
            continue;
        }

        out.push_str(&format!("\n## {heading}\n\n"));
        for entry in entries {
            out.push_str(&format!(
                "- [{}]({}): raw {}\n",
                entry.artifact_path, entry.canonical_url, entry.raw_url
            ));
        }
    }

    out
}

/// Parsed `links.md`.
#[derive(Debug, Clone)]
pub struct ParsedLinks {
    pub title: String,
    pub summary: Option<String>,
    pub sections: Vec<LinkSection>,
}

impl ParsedLinks {
    /// All links across sections, in file order.
    pub fn links(&self) -> impl Iterator<Item = &LinkLine> {
        self.sections.iter().flat_map(|s| s.links.iter())
    }
}

/// A `## heading` and its links.
#[derive(Debug, Clone)]
pub struct LinkSection {
    pub title: String,
    pub links: Vec<LinkLine>,
}

/// `- [name](url): notes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkLine {
    pub name: String,
    pub url: String,
    pub notes: Option<String>,
}

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\s+(.+)$").expect("H1 regex"));

static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^##\s+(.+)$").expect("H2 regex"));

static BLOCKQUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s*(.+)$").expect("blockquote regex"));

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-*]\s+\[([^\]]+)\]\(([^)\s]+)\)(?::\s*(.+))?$").expect("link regex")
});

/// Parse an llms.txt-format link list.
///
/// Links before the first `##` heading land in an untitled section.
pub fn parse_links_md(content: &str) -> Result<ParsedLinks> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();

    let title = match lines.next() {
        Some(line) => match H1_RE.captures(line) {
            Some(caps) => caps[1].trim().to_string(),
            None => {
                return Err(AiDataError::parse(
                    "links.md must start with an H1 heading (# Title)",
                ));
            }
        },
        None => return Err(AiDataError::parse("links.md is empty")),
    };

    let mut summary_parts = Vec::new();
    while let Some(caps) = lines.peek().and_then(|l| BLOCKQUOTE_RE.captures(*l)) {
        summary_parts.push(caps[1].trim().to_string());
        lines.next();
    }
    let summary = (!summary_parts.is_empty()).then(|| summary_parts.join(" "));

    let mut sections: Vec<LinkSection> = Vec::new();
    for line in lines {
        if let Some(caps) = H2_RE.captures(line) {
            sections.push(LinkSection {
                title: caps[1].trim().to_string(),
                links: Vec::new(),
            });
            continue;
        }

        if let Some(caps) = LINK_RE.captures(line) {
            let link = LinkLine {
                name: caps[1].trim().to_string(),
                url: caps[2].trim().to_string(),
                notes: caps.get(3).map(|m| m.as_str().trim().to_string()),
            };
            match sections.last_mut() {
                Some(section) => section.links.push(link),
                None => sections.push(LinkSection {
                    title: String::new(),
                    links: vec![link],
                }),
            }
        } else {
            debug!(line, "ignoring non-link line in links.md");
        }
    }

    Ok(ParsedLinks {
        title,
        summary,
        sections,
    })
}

// ---------------------------------------------------------------------------
// sitemap.xml
// ---------------------------------------------------------------------------

/// A sitemap `urlset` of every canonical URL.
pub fn render_sitemap(manifest: &LinkManifest) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in &manifest.entries {
        out.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n  </url>\n",
            xml_escape(&entry.canonical_url)
        ));
    }
    out.push_str("</urlset>\n");
    out
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// What went wrong with one manifest link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// The URL is not under the canonical base.
    OutsideBase,
    /// The artifact file does not exist.
    Missing,
    /// The file exists but its checksum differs from the manifest.
    ChecksumMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VerifyProblem {
    pub kind: ProblemKind,
    pub url: String,
    pub detail: String,
}

/// Result of [`verify_manifest`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifyReport {
    pub manifest: PathBuf,
    pub checked: usize,
    pub problems: Vec<VerifyProblem>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Re-ingest a manifest and resolve every canonical URL under `root`.
///
/// `manifest` defaults to `root/index.json`. For `links.md`, the canonical
/// base comes from `canonical_base`, else from `root/index.json`.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn verify_manifest(
    root: &Path,
    manifest: Option<&Path>,
    canonical_base: Option<&str>,
) -> Result<VerifyReport> {
    let manifest_path = manifest
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(INDEX_JSON));
    let content = std::fs::read_to_string(&manifest_path)
        .map_err(|e| AiDataError::io(&manifest_path, e))?;

    let is_markdown = manifest_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("txt"));

    // (canonical url, expected sha256)
    let (base, links): (String, Vec<(String, Option<String>)>) = if is_markdown {
        let parsed = parse_links_md(&content)?;
        let base = match canonical_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => read_manifest(&root.join(INDEX_JSON))?.canonical_base_url,
        };
        let links = parsed.links().map(|l| (l.url.clone(), None)).collect();
        (base, links)
    } else {
        let manifest: LinkManifest = serde_json::from_str(&content).map_err(|e| {
            AiDataError::validation(format!("invalid {}: {e}", manifest_path.display()))
        })?;
        let links = manifest
            .entries
            .into_iter()
            .map(|e| (e.canonical_url, Some(e.sha256)))
            .collect();
        (manifest.canonical_base_url, links)
    };

    let bases = LinkBases {
        canonical: base.clone(),
        raw: base,
    };

    let mut problems = Vec::new();
    for (url, expected_sha) in &links {
        if let Some(problem) = check_link(root, &bases, url, expected_sha.as_deref()) {
            warn!(url = %problem.url, kind = ?problem.kind, "manifest link failed verification");
            problems.push(problem);
        }
    }

    info!(checked = links.len(), problems = problems.len(), "manifest verified");

    Ok(VerifyReport {
        manifest: manifest_path,
        checked: links.len(),
        problems,
    })
}

fn check_link(
    root: &Path,
    bases: &LinkBases,
    url: &str,
    expected_sha: Option<&str>,
) -> Option<VerifyProblem> {
    let problem = |kind, detail: String| {
        Some(VerifyProblem {
            kind,
            url: url.to_string(),
            detail,
        })
    };

    let Some(rel_path) = bases
        .artifact_path_of(url)
        .filter(|p| !p.split('/').any(|part| part == ".." || part.is_empty()))
    else {
        return problem(
            ProblemKind::OutsideBase,
            format!("not under {}", bases.canonical),
        );
    };

    let path = rel_path.split('/').fold(root.to_path_buf(), |acc, p| acc.join(p));
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(_) => return problem(ProblemKind::Missing, format!("{} not found", path.display())),
    };

    match expected_sha {
        Some(expected) if sha256_hex(&bytes) != expected => problem(
            ProblemKind::ChecksumMismatch,
            format!("{rel_path} changed since the manifest was written"),
        ),
        _ => None,
    }
}

fn read_manifest(path: &Path) -> Result<LinkManifest> {
    let content = std::fs::read_to_string(path).map_err(|e| AiDataError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| AiDataError::validation(format!("invalid {}: {e}", path.display())))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{write_artifact, write_json};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("aidata-index-test-{}", uuid::Uuid::now_v7()))
    }

    fn bases() -> LinkBases {
        LinkBases {
            canonical: "https://acme.github.io/site-data".into(),
            raw: "https://raw.githubusercontent.com/Acme/site-data/main".into(),
        }
    }

    fn entry(path: &str, kind: ArtifactKind, category: Option<Category>, meta: &ArtifactMeta) -> IndexEntry {
        let b = bases();
        IndexEntry {
            artifact_path: path.into(),
            kind,
            category,
            source_record_ids: vec!["1".into()],
            canonical_url: b.canonical_url(path),
            raw_url: b.raw_url(path),
            sha256: meta.sha256.clone(),
            size_bytes: meta.size_bytes,
        }
    }

    /// Writes two artifacts plus index.json and links.md.
    fn fixture(root: &Path) -> LinkManifest {
        let schema = write_artifact(root, "schemas/services/roofing.json", "{}\n").unwrap();
        let doc = write_artifact(root, "docs/services.md", "# Services\n").unwrap();
        let manifest = build_manifest(
            "Acme",
            &bases(),
            vec![
                entry(&schema.path, ArtifactKind::Schema, Some(Category::Service), &schema),
                entry(&doc.path, ArtifactKind::Document, Some(Category::Service), &doc),
            ],
        );
        write_json(root, INDEX_JSON, &manifest).unwrap();
        write_artifact(root, LINKS_MD, &render_links_md(&manifest, &AppConfig::default())).unwrap();
        manifest
    }

    #[test]
    fn links_md_groups_by_heading() {
        let root = temp_dir();
        let manifest = fixture(&root);
        let md = render_links_md(&manifest, &AppConfig::default());

        assert!(md.starts_with("# Acme AI Data Index\n\n> "));
        assert!(md.contains(
            "\n## Services\n\n- [schemas/services/roofing.json](https://acme.github.io/site-data/schemas/services/roofing.json): raw https://raw.githubusercontent.com/Acme/site-data/main/schemas/services/roofing.json\n"
        ));

        let parsed = parse_links_md(&md).unwrap();
        assert_eq!(parsed.title, "Acme AI Data Index");
        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(parsed.links().count(), 2);
        let first = parsed.links().next().unwrap();
        assert_eq!(first.name, "schemas/services/roofing.json");
        assert!(first.notes.as_deref().unwrap().starts_with("raw https://raw."));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn links_md_headings_stay_single_line() {
        let root = temp_dir();
        let mut manifest = fixture(&root);
        manifest.site_name = "Acme\n# Builders".into();
        let mut config = AppConfig::default();
        config.headings.insert("service".into(), "Roofs\nand Decks".into());
        config.site.description = Some("Line one.\n\nLine two.".into());

        let md = render_links_md(&manifest, &config);
        assert!(md.starts_with("# Acme # Builders AI Data Index\n\n> Line one. Line two.\n"));
        assert!(md.contains("\n## Roofs and Decks\n\n- [schemas/services/roofing.json]"));

        let parsed = parse_links_md(&md).unwrap();
        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(parsed.links().count(), 2);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn parse_links_requires_title() {
        assert!(parse_links_md("").is_err());
        assert!(parse_links_md("- [a](https://x)").is_err());
    }

    #[test]
    fn sitemap_escapes_urls() {
        let manifest = LinkManifest {
            entries: vec![IndexEntry {
                canonical_url: "https://x.example/a?b=1&c=<2>".into(),
                ..entry(
                    "a",
                    ArtifactKind::Document,
                    None,
                    &ArtifactMeta {
                        path: "a".into(),
                        sha256: String::new(),
                        size_bytes: 0,
                    },
                )
            }],
            ..build_manifest("Acme", &bases(), vec![])
        };
        let xml = render_sitemap(&manifest);
        assert!(xml.contains("<loc>https://x.example/a?b=1&amp;c=&lt;2&gt;</loc>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn fresh_manifest_verifies_clean() {
        let root = temp_dir();
        fixture(&root);

        let report = verify_manifest(&root, None, None).unwrap();
        assert_eq!(report.checked, 2);
        assert!(report.is_clean(), "{:?}", report.problems);

        // links.md resolves against the base recorded in index.json.
        let report = verify_manifest(&root, Some(&root.join(LINKS_MD)), None).unwrap();
        assert_eq!(report.checked, 2);
        assert!(report.is_clean());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn verify_reports_missing_tampered_and_foreign_links() {
        let root = temp_dir();
        let mut manifest = fixture(&root);

        std::fs::remove_file(root.join("docs/services.md")).unwrap();
        std::fs::write(root.join("schemas/services/roofing.json"), "{\"x\":1}\n").unwrap();
        manifest.entries.push(IndexEntry {
            canonical_url: "https://elsewhere.example/schemas/x.json".into(),
            ..manifest.entries[0].clone()
        });
        write_json(&root, INDEX_JSON, &manifest).unwrap();

        let report = verify_manifest(&root, None, None).unwrap();
        let kinds: Vec<ProblemKind> = report.problems.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ProblemKind::ChecksumMismatch,
                ProblemKind::Missing,
                ProblemKind::OutsideBase
            ]
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn traversal_urls_are_outside_base() {
        let root = temp_dir();
        let problem = check_link(
            &root,
            &bases(),
            "https://acme.github.io/site-data/../secret",
            None,
        )
        .unwrap();
        assert_eq!(problem.kind, ProblemKind::OutsideBase);
    }
}
