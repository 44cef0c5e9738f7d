//! Core domain types for the content pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AiDataError;

/// Current schema version for `index.json` and `generation-report.json`.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one generation run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Content categories with a registered field template and document section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Organization,
    Service,
    Faq,
    Testimonial,
    Person,
    Location,
    Sponsorship,
    HelpArticle,
    Product,
    Award,
    PressMention,
    CaseStudy,
}

impl Category {
    /// Fixed order in which categories are rendered and indexed.
    pub const DISPLAY_ORDER: [Category; 12] = [
        Category::Organization,
        Category::Service,
        Category::Faq,
        Category::Testimonial,
        Category::Person,
        Category::Location,
        Category::Sponsorship,
        Category::HelpArticle,
        Category::Product,
        Category::Award,
        Category::PressMention,
        Category::CaseStudy,
    ];

    /// Stable snake_case key, used in config (`[headings]`) and serialized output.
    pub fn key(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Service => "service",
            Self::Faq => "faq",
            Self::Testimonial => "testimonial",
            Self::Person => "person",
            Self::Location => "location",
            Self::Sponsorship => "sponsorship",
            Self::HelpArticle => "help_article",
            Self::Product => "product",
            Self::Award => "award",
            Self::PressMention => "press",
            Self::CaseStudy => "case_study",
        }
    }

    /// Output folder name under `schemas/` and file stem under `docs/`.
    pub fn bucket(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Service => "services",
            Self::Faq => "faqs",
            Self::Testimonial => "testimonials",
            Self::Person => "team",
            Self::Location => "locations",
            Self::Sponsorship => "sponsorships",
            Self::HelpArticle => "help-articles",
            Self::Product => "products",
            Self::Award => "awards",
            Self::PressMention => "press",
            Self::CaseStudy => "case-studies",
        }
    }

    /// Section heading used when the config does not override it.
    pub fn default_heading(self) -> &'static str {
        match self {
            Self::Organization => "About",
            Self::Service => "Services",
            Self::Faq => "Frequently Asked Questions",
            Self::Testimonial => "Testimonials",
            Self::Person => "Team",
            Self::Location => "Locations",
            Self::Sponsorship => "Community Sponsorships",
            Self::HelpArticle => "Help Articles",
            Self::Product => "Products",
            Self::Award => "Awards & Certifications",
            Self::PressMention => "In the News",
            Self::CaseStudy => "Case Studies",
        }
    }

    /// Source labels (category cells, file stems) accepted for this category.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Organization => &[
                "organization",
                "business info",
                "business information",
                "company",
                "firm info",
                "entity info",
                "core info",
            ],
            Self::Service => &[
                "service",
                "services",
                "practice areas",
                "practice area",
                "service areas",
                "offerings",
            ],
            Self::Faq => &["faq", "faqs", "question", "questions"],
            Self::Testimonial => &["testimonial", "testimonials", "review", "reviews"],
            Self::Person => &[
                "person",
                "people",
                "team",
                "team member",
                "staff",
                "leadership",
            ],
            Self::Location => &["location", "locations", "office", "offices"],
            Self::Sponsorship => &[
                "sponsorship",
                "sponsorships",
                "community",
                "community involvement",
                "sponsors",
            ],
            Self::HelpArticle => &[
                "help article",
                "help articles",
                "article",
                "articles",
                "guides",
                "blog",
                "help",
            ],
            Self::Product => &["product", "products"],
            Self::Award => &[
                "award",
                "awards",
                "awards & certifications",
                "certifications",
                "accreditations",
                "licenses",
            ],
            Self::PressMention => &[
                "press",
                "press mentions",
                "press/news mentions",
                "news",
                "media",
                "media mentions",
            ],
            Self::CaseStudy => &["case study", "case studies", "matters", "results"],
        }
    }

    /// Resolve a free-form label to a category.
    ///
    /// Case-insensitive; `_` and `-` count as spaces and whitespace runs collapse.
    pub fn from_label(label: &str) -> Option<Category> {
        let wanted = normalize_label(label);
        if wanted.is_empty() {
            return None;
        }

        Self::DISPLAY_ORDER.into_iter().find(|category| {
            normalize_label(category.key()) == wanted
                || category
                    .aliases()
                    .iter()
                    .any(|alias| normalize_label(alias) == wanted)
        })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Lowercase, treat `_`/`-` as spaces, collapse whitespace.
fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A record's category as read from the source.
///
/// Unknown labels are kept verbatim so they can be reported downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordCategory {
    Known(Category),
    Unknown(String),
}

impl RecordCategory {
    /// Resolve a raw label, keeping it as `Unknown` when no alias matches.
    pub fn from_label(label: &str) -> Self {
        match Category::from_label(label) {
            Some(category) => Self::Known(category),
            None => Self::Unknown(label.trim().to_string()),
        }
    }

    /// The resolved category, if any.
    pub fn known(&self) -> Option<Category> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Unknown(_) => None,
        }
    }

    /// Human-readable label for logs and issues.
    pub fn label(&self) -> &str {
        match self {
            Self::Known(category) => category.key(),
            Self::Unknown(label) => label,
        }
    }
}

// ---------------------------------------------------------------------------
// ContentRecord
// ---------------------------------------------------------------------------

/// One row of source content (a service, FAQ, testimonial, team member, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    /// Unique id within the source.
    pub id: String,
    /// Resolved (or unknown) category.
    pub category: RecordCategory,
    /// Display title (service name, question, person's name, ...).
    pub title: String,
    /// Main text (description, answer, quote, bio, ...).
    pub body: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Extra non-blank columns, keyed by lowercase header name.
    pub fields: BTreeMap<String, String>,
    /// 1-based row in the source file, for diagnostics.
    pub row: usize,
}

impl ContentRecord {
    /// First non-blank extra field among `keys`.
    pub fn field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Link manifest
// ---------------------------------------------------------------------------

/// What produced an indexed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A JSON-LD schema file (one source record).
    Schema,
    /// A rendered markdown document (one or more source records).
    Document,
}

/// One generated artifact in the link manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Path relative to the output root, `/`-separated.
    pub artifact_path: String,
    /// Schema file or markdown document.
    pub kind: ArtifactKind,
    /// Category the artifact belongs to (`None` for the combined knowledge file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Source record ids this artifact was generated from.
    pub source_record_ids: Vec<String>,
    /// Stable public address of the artifact.
    pub canonical_url: String,
    /// Raw-content address of the artifact.
    pub raw_url: String,
    /// SHA-256 of the written bytes.
    pub sha256: String,
    /// Size of the written file.
    pub size_bytes: usize,
}

/// Root structure of `index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Site (organization) name.
    pub site_name: String,
    /// Tool version that generated the manifest.
    pub tool_version: String,
    /// When the manifest was generated.
    pub generated_at: DateTime<Utc>,
    /// Base of every canonical URL.
    pub canonical_base_url: String,
    /// Base of every raw URL.
    pub raw_base_url: String,
    /// One entry per generated artifact.
    pub entries: Vec<IndexEntry>,
}

// ---------------------------------------------------------------------------
// Issues and run report
// ---------------------------------------------------------------------------

/// Kind of per-record problem. None of these abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MalformedRecord,
    UnknownCategory,
    MissingField,
    DuplicateId,
}

/// A record that was skipped, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIssue {
    pub kind: IssueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_label: Option<String>,
    pub message: String,
}

impl RecordIssue {
    /// Build an issue from a per-record error. Returns `None` for fatal errors.
    pub fn from_error(err: &AiDataError) -> Option<Self> {
        let kind = err.issue_kind()?;
        let (record_id, row, category_label) = match err {
            AiDataError::MalformedRecord { row, .. } => (None, Some(*row), None),
            AiDataError::UnknownCategory { record_id, label } => {
                (Some(record_id.clone()), None, Some(label.clone()))
            }
            AiDataError::MissingField {
                record_id,
                category,
                ..
            } => (Some(record_id.clone()), None, Some(category.key().to_string())),
            AiDataError::DuplicateId { record_id, row } => {
                (Some(record_id.clone()), Some(*row), None)
            }
            _ => (None, None, None),
        };

        Some(Self {
            kind,
            record_id,
            row,
            category_label,
            message: err.to_string(),
        })
    }

    /// Attach the source row of the offending record.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// The `generation-report.json` written at the end of every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: u32,
    pub run_id: RunId,
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    /// Input path as given on the command line.
    pub input: String,
    pub records_loaded: usize,
    pub records_emitted: usize,
    pub schema_count: usize,
    pub document_count: usize,
    pub issues: Vec<RecordIssue>,
}
