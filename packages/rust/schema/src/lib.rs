//! Schema emitter: maps content records onto schema.org JSON-LD artifacts.
//!
//! Every artifact is built by the [`SchemaTemplate`] registered for the
//! record's category and checked against that template's required fields.
//! A record that fails (unknown category, missing field) is skipped and
//! reported; it never aborts the run.

pub mod templates;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, instrument};

use aidata_shared::{
    AiDataError, Category, ContentRecord, RecordCategory, RecordIssue, Result, SiteConfig,
    slugify,
};

pub use templates::{RequiredField, SchemaTemplate, TemplateRegistry};

/// JSON-LD context for every artifact.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Folder (under the output root) holding all schema artifacts.
pub const SCHEMAS_DIR: &str = "schemas";

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The organization other artifacts point at (`provider`, `worksFor`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRef {
    pub schema_type: String,
    pub name: String,
    pub url: Option<String>,
}

impl OrganizationRef {
    /// Reference node: `{"@type", "name", "url"?}`.
    pub fn to_node(&self) -> Value {
        let mut node = Map::new();
        node.insert("@type".into(), Value::String(self.schema_type.clone()));
        node.insert("name".into(), Value::String(self.name.clone()));
        if let Some(url) = &self.url {
            node.insert("url".into(), Value::String(url.clone()));
        }
        Value::Object(node)
    }
}

/// Site-wide data templates can draw on.
#[derive(Debug, Clone)]
pub struct EmitContext {
    pub site: SiteConfig,
    pub organization: OrganizationRef,
}

impl EmitContext {
    /// Context built from site config alone.
    pub fn new(site: SiteConfig) -> Self {
        let organization = OrganizationRef {
            schema_type: site.organization_type.clone(),
            name: site.name.clone(),
            url: site.url.clone(),
        };
        Self { site, organization }
    }

    /// Context where the first Organization record (if any) names the organization.
    pub fn from_records(site: &SiteConfig, records: &[ContentRecord]) -> Self {
        let mut ctx = Self::new(site.clone());

        let org_record = records
            .iter()
            .find(|r| r.category == RecordCategory::Known(Category::Organization));

        if let Some(record) = org_record {
            if !record.title.trim().is_empty() {
                ctx.organization.name = record.title.trim().to_string();
            }
            if let Some(url) = record.field(&["url", "website", "main_website_url"]) {
                ctx.organization.url = Some(url.to_string());
            }
            debug!(name = %ctx.organization.name, "organization taken from source record");
        }

        ctx
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// One emitted JSON-LD document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaArtifact {
    pub record_id: String,
    pub category: Category,
    pub schema_type: String,
    pub slug: String,
    /// Path relative to the output root (`schemas/<bucket>/<slug>.json`).
    pub path: String,
    pub value: Value,
}

impl SchemaArtifact {
    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.value)
            .map_err(|e| AiDataError::Serialization(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

/// Result of emitting a batch of records.
#[derive(Debug, Default)]
pub struct EmitOutcome {
    /// Artifacts in record order.
    pub artifacts: Vec<SchemaArtifact>,
    /// Records that were skipped, and why.
    pub issues: Vec<RecordIssue>,
}

impl EmitOutcome {
    /// Ids of records that produced an artifact.
    pub fn emitted_ids(&self) -> HashSet<&str> {
        self.artifacts.iter().map(|a| a.record_id.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// Build and validate the JSON-LD object for one record.
///
/// Fails with `UnknownCategory` when no template handles the record and with
/// `MissingField` when a required field is empty.
pub fn emit_value(
    record: &ContentRecord,
    registry: &TemplateRegistry,
    ctx: &EmitContext,
) -> Result<(Category, String, Value)> {
    let unknown = || AiDataError::UnknownCategory {
        record_id: record.id.clone(),
        label: record.category.label().to_string(),
    };

    let category = record.category.known().ok_or_else(unknown)?;
    let template = registry.get(category).ok_or_else(unknown)?;

    let schema_type = template.schema_type(ctx);
    let mut object = Map::new();
    object.insert("@context".into(), json!(SCHEMA_CONTEXT));
    object.insert("@type".into(), json!(schema_type));
    object.insert("identifier".into(), json!(record.id));
    object.extend(template.build(record, ctx));
    let value = Value::Object(object);

    for field in template.required_fields() {
        let present = value
            .pointer(field.pointer)
            .is_some_and(templates::is_present);
        if !present {
            return Err(AiDataError::MissingField {
                record_id: record.id.clone(),
                category,
                field: field.name.to_string(),
            });
        }
    }

    Ok((category, schema_type, value))
}

/// Emit artifacts for every record, assigning deterministic file paths.
///
/// Failures are logged once at `error` level and collected as issues.
#[instrument(skip_all, fields(records = records.len()))]
pub fn emit_all(
    records: &[ContentRecord],
    registry: &TemplateRegistry,
    ctx: &EmitContext,
) -> EmitOutcome {
    let mut outcome = EmitOutcome::default();
    let mut slugs = SlugAllocator::default();

    for record in records {
        match emit_value(record, registry, ctx) {
            Ok((category, schema_type, value)) => {
                let slug = slugs.allocate(category, record);
                let path = artifact_path(category, &slug);
                debug!(record_id = %record.id, %path, "schema emitted");
                outcome.artifacts.push(SchemaArtifact {
                    record_id: record.id.clone(),
                    category,
                    schema_type,
                    slug,
                    path,
                    value,
                });
            }
            Err(err) => {
                error!(record_id = %record.id, row = record.row, error = %err, "record skipped");
                if let Some(issue) = RecordIssue::from_error(&err) {
                    outcome.issues.push(issue.at_row(record.row));
                }
            }
        }
    }

    info!(
        emitted = outcome.artifacts.len(),
        skipped = outcome.issues.len(),
        "schema emission complete"
    );
    outcome
}

/// `schemas/<bucket>/<slug>.json`.
pub fn artifact_path(category: Category, slug: &str) -> String {
    format!("{SCHEMAS_DIR}/{}/{slug}.json", category.bucket())
}

/// Hands out unique slugs per category bucket.
#[derive(Debug, Default)]
struct SlugAllocator {
    taken: HashMap<Category, HashSet<String>>,
}

impl SlugAllocator {
    /// Preferred slug: `organization` for the organization bucket, else the
    /// record's `slug` field, title, or id. Collisions get the id appended.
    fn allocate(&mut self, category: Category, record: &ContentRecord) -> String {
        let base = if category == Category::Organization {
            "organization".to_string()
        } else {
            let source = record
                .field(&["slug"])
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| {
                    if record.title.trim().is_empty() {
                        record.id.as_str()
                    } else {
                        record.title.as_str()
                    }
                });
            slugify(source)
        };

        let taken = self.taken.entry(category).or_default();
        let mut candidate = base.clone();
        if taken.contains(&candidate) {
            candidate = format!("{base}-{}", slugify(&record.id));
        }
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}-{}-{n}", slugify(&record.id));
            n += 1;
        }

        taken.insert(candidate.clone());
        candidate
    }
}
