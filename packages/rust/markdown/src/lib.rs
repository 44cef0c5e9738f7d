//! Document renderer: content records → grouped markdown documents.
//!
//! Records are grouped by category in [`Category::DISPLAY_ORDER`], one
//! document per non-empty category (`docs/<bucket>.md`), plus a combined
//! knowledge file (`docs/knowledge.md`) holding every section. Output is a
//! pure function of the records and config: no timestamps, no hash-map order.

mod cleanup;

use tracing::{debug, instrument};

use aidata_shared::{AppConfig, Category, ContentRecord};

/// Folder (under the output root) holding rendered documents.
pub const DOCS_DIR: &str = "docs";

/// Path of the combined knowledge file.
pub const KNOWLEDGE_PATH: &str = "docs/knowledge.md";

const AUTHOR_FIELDS: &[&str] = &["author", "reviewer", "client", "client_name", "name"];
const ROLE_FIELDS: &[&str] = &["role", "job_title", "title", "position"];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One record rendered as a block under its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    pub record_id: String,
    /// Single-line heading text.
    pub heading: String,
    /// Cleaned markdown body (may be empty).
    pub body: String,
    pub tags: Vec<String>,
}

/// All records of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSection {
    pub category: Category,
    pub heading: String,
    /// Category bucket (`services`, `faqs`, ...).
    pub slug: String,
    /// Path relative to the output root.
    pub path: String,
    pub blocks: Vec<DocumentBlock>,
}

impl DocumentSection {
    pub fn record_ids(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.record_id.clone()).collect()
    }
}

/// A markdown file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Path relative to the output root.
    pub path: String,
    /// `None` for the combined knowledge file.
    pub category: Option<Category>,
    pub title: String,
    pub record_ids: Vec<String>,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Group records into sections in display order.
///
/// Records with an unknown category are left out; empty categories produce
/// no section. Within a section, records keep their input order.
pub fn build_sections(records: &[ContentRecord], config: &AppConfig) -> Vec<DocumentSection> {
    Category::DISPLAY_ORDER
        .iter()
        .filter_map(|&category| {
            let members: Vec<&ContentRecord> = records
                .iter()
                .filter(|r| r.category.known() == Some(category))
                .collect();
            if members.is_empty() {
                return None;
            }

            let blocks = members
                .into_iter()
                .map(|record| build_block(record, category))
                .collect();

            Some(DocumentSection {
                category,
                heading: inline_text(&config.heading_for(category)),
                slug: category.bucket().to_string(),
                path: format!("{DOCS_DIR}/{}.md", category.bucket()),
                blocks,
            })
        })
        .collect()
}

fn build_block(record: &ContentRecord, category: Category) -> DocumentBlock {
    let heading = match inline_text(&record.title) {
        title if title.is_empty() => inline_text(&record.id),
        title => title,
    };

    DocumentBlock {
        record_id: record.id.clone(),
        body: block_body(record, category, &heading),
        heading,
        tags: record.tags.clone(),
    }
}

/// Collapse every whitespace run (newlines included) to one space.
///
/// Used for all text that lands on a heading, quote attribution, or summary
/// line, so a multi-line cell can never open a new markdown block.
pub fn inline_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Category-specific body text, cleaned.
fn block_body(record: &ContentRecord, category: Category, heading: &str) -> String {
    let cleaned = if record.body.trim().is_empty() {
        String::new()
    } else {
        cleanup::clean_body(&record.body)
    };

    match category {
        Category::Testimonial => {
            let author = record
                .field(AUTHOR_FIELDS)
                .map(inline_text)
                .unwrap_or_else(|| heading.to_string());
            let quote = cleaned
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            if quote.is_empty() {
                format!("— {author}\n")
            } else {
                format!("{quote}\n\n— {author}\n")
            }
        }
        Category::Person => match record.field(ROLE_FIELDS).map(inline_text) {
            Some(role) if cleaned.is_empty() => format!("*{role}*\n"),
            Some(role) => format!("*{role}*\n\n{cleaned}"),
            None => cleaned,
        },
        _ => cleaned,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render every section document, then the knowledge file.
///
/// Returns an empty list when there are no sections.
#[instrument(skip_all, fields(records = records.len()))]
pub fn render_documents(records: &[ContentRecord], config: &AppConfig) -> Vec<RenderedDocument> {
    let sections = build_sections(records, config);
    if sections.is_empty() {
        return Vec::new();
    }

    let mut documents: Vec<RenderedDocument> = sections
        .iter()
        .map(|section| RenderedDocument {
            path: section.path.clone(),
            category: Some(section.category),
            title: section.heading.clone(),
            record_ids: section.record_ids(),
            content: render_section(section, &config.site.name),
        })
        .collect();

    documents.push(RenderedDocument {
        path: KNOWLEDGE_PATH.to_string(),
        category: None,
        title: inline_text(&config.site.name),
        record_ids: sections.iter().flat_map(|s| s.record_ids()).collect(),
        content: render_knowledge(&sections, config),
    });

    debug!(documents = documents.len(), "documents rendered");
    documents
}

/// One category document: frontmatter, `# heading`, a `##` block per record.
pub fn render_section(section: &DocumentSection, site_name: &str) -> String {
    let frontmatter = build_frontmatter(&[
        ("title", FrontValue::Text(&section.heading)),
        ("category", FrontValue::Text(section.category.key())),
        ("site", FrontValue::Text(site_name)),
        ("records", FrontValue::Count(section.blocks.len())),
    ]);

    let mut out = frontmatter;
    out.push('\n');
    out.push_str(&format!("# {}\n", section.heading));
    for block in &section.blocks {
        out.push('\n');
        out.push_str(&render_block(block, 2));
    }
    cleanup::ensure_trailing_newline(&out)
}

/// The combined knowledge file: site title, summary, every section.
pub fn render_knowledge(sections: &[DocumentSection], config: &AppConfig) -> String {
    let site_name = inline_text(&config.site.name);
    let records: usize = sections.iter().map(|s| s.blocks.len()).sum();
    let summary = match config.site.description.as_deref().map(inline_text) {
        Some(text) if !text.is_empty() => text,
        _ => {
            let headings: Vec<&str> = sections.iter().map(|s| s.heading.as_str()).collect();
            format!("{site_name}: {}.", headings.join(", "))
        }
    };

    let mut out = build_frontmatter(&[
        ("title", FrontValue::Text(&site_name)),
        ("site", FrontValue::Text(&site_name)),
        ("records", FrontValue::Count(records)),
    ]);
    out.push('\n');
    out.push_str(&format!("# {site_name}\n\n"));
    out.push_str(&format!("> {summary}\n"));

    for section in sections {
        out.push_str(&format!("\n## {}\n", section.heading));
        for block in &section.blocks {
            out.push('\n');
            out.push_str(&render_block(block, 3));
        }
    }
    cleanup::ensure_trailing_newline(&out)
}

/// A record block with its heading at `level`.
fn render_block(block: &DocumentBlock, level: usize) -> String {
    let mut out = format!("{} {}\n", "#".repeat(level), block.heading);
    if !block.body.is_empty() {
        out.push('\n');
        out.push_str(&block.body);
    }
    if !block.tags.is_empty() {
        out.push('\n');
        out.push_str(&format!("Tags: {}\n", block.tags.join(", ")));
    }
    cleanup::normalize_whitespace(&out) + "\n"
}

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

enum FrontValue<'a> {
    Text(&'a str),
    Count(usize),
}

/// Build a YAML frontmatter block.
fn build_frontmatter(fields: &[(&str, FrontValue<'_>)]) -> String {
    let mut fm = String::from("---\n");
    for (key, value) in fields {
        match value {
            FrontValue::Text(text) => {
                fm.push_str(&format!("{key}: \"{}\"\n", escape_yaml_string(text)));
            }
            FrontValue::Count(n) => fm.push_str(&format!("{key}: {n}\n")),
        }
    }
    fm.push_str("---\n");
    fm
}

/// Escape special characters in a YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
