//! Data source loader: tabular files → [`ContentRecord`]s.
//!
//! Accepts a CSV file, a JSON file, or a directory of both. A file whose stem
//! names a category (`services.csv`, `FAQs.json`, `Team.csv`) supplies that
//! category to rows that lack one. Rows that cannot become records are
//! skipped and reported in [`LoadOutcome::rejected`]; they never abort the load.

mod csv_source;
mod json_source;
mod mapper;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use aidata_shared::{AiDataError, Category, ContentRecord, RecordIssue, Result};

use crate::mapper::RawRow;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Supported tabular formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Result of loading a source.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Records in source order (file-name order for directories).
    pub records: Vec<ContentRecord>,
    /// Rows that were skipped, with the reason.
    pub rejected: Vec<RecordIssue>,
    /// Files that were read.
    pub files: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load records from a file or a directory of `.csv`/`.json` files.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<LoadOutcome> {
    let files = if path.is_dir() {
        list_source_files(path)?
    } else {
        if SourceFormat::from_path(path).is_none() {
            return Err(AiDataError::parse(format!(
                "unsupported input '{}': expected a .csv or .json file",
                path.display()
            )));
        }
        vec![path.to_path_buf()]
    };

    let mut collector = Collector::default();

    for file in &files {
        let format = SourceFormat::from_path(file)
            .ok_or_else(|| AiDataError::parse(format!("unsupported input '{}'", file.display())))?;
        let default_category = file_category(file);
        let content = std::fs::read_to_string(file).map_err(|e| AiDataError::io(file, e))?;
        let origin = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());

        debug!(file = %file.display(), ?format, ?default_category, "reading source file");
        collector.ingest(&content, format, &origin, default_category)?;
        collector.outcome.files.push(file.clone());
    }

    let outcome = collector.finish();
    info!(
        files = outcome.files.len(),
        records = outcome.records.len(),
        rejected = outcome.rejected.len(),
        "source loaded"
    );
    Ok(outcome)
}

/// Load records from in-memory content.
pub fn load_str(
    content: &str,
    format: SourceFormat,
    origin: &str,
    default_category: Option<Category>,
) -> Result<LoadOutcome> {
    let mut collector = Collector::default();
    collector.ingest(content, format, origin, default_category)?;
    Ok(collector.finish())
}

/// Category implied by a file stem (`services.csv` → Service), if any.
fn file_category(path: &Path) -> Option<Category> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(Category::from_label)
}

/// `.csv`/`.json` files directly inside `dir`, sorted by file name.
fn list_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| AiDataError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AiDataError::io(dir, e))?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if path.is_file() && !hidden && SourceFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(AiDataError::validation(format!(
            "no .csv or .json files found in {}",
            dir.display()
        )));
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Accumulates records across files, enforcing unique ids.
#[derive(Default)]
struct Collector {
    outcome: LoadOutcome,
    seen_ids: HashSet<String>,
}

impl Collector {
    fn ingest(
        &mut self,
        content: &str,
        format: SourceFormat,
        origin: &str,
        default_category: Option<Category>,
    ) -> Result<()> {
        let (rows, errors) = match format {
            SourceFormat::Csv => csv_source::read_rows(content.as_bytes(), origin)?,
            SourceFormat::Json => json_source::read_rows(content, origin)?,
        };

        for err in errors {
            self.reject(&err);
        }

        for raw in rows.into_iter().filter(|r| !r.is_blank()) {
            self.accept(raw, default_category, origin);
        }
        Ok(())
    }

    fn accept(&mut self, raw: RawRow, default_category: Option<Category>, origin: &str) {
        let record = match mapper::map_row(raw, default_category, origin) {
            Ok(record) => record,
            Err(err) => {
                self.reject(&err);
                return;
            }
        };

        if !self.seen_ids.insert(record.id.clone()) {
            self.reject(&AiDataError::DuplicateId {
                record_id: record.id,
                row: record.row,
            });
            return;
        }

        self.outcome.records.push(record);
    }

    fn reject(&mut self, err: &AiDataError) {
        warn!(error = %err, "skipping source row");
        if let Some(issue) = RecordIssue::from_error(err) {
            self.outcome.rejected.push(issue);
        }
    }

    fn finish(self) -> LoadOutcome {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidata_shared::{IssueKind, RecordCategory};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aidata-source-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const MASTER_CSV: &str = "\
id,category,title,body,tags
1,Service,Custom Home Building,We build homes from the ground up.,homes|custom
2,FAQ,Do you offer warranties?,Yes - ten years structural.,
,Service,No Id Here,Body,
3,,No Category,Body,
4,Unknown,Mystery,Body,
1,Service,Duplicate,Body,
,,,,
5,Testimonial,Great crew,They finished on time.,
";

    #[test]
    fn load_str_reports_rejections_and_keeps_order() {
        let outcome = load_str(MASTER_CSV, SourceFormat::Csv, "master.csv", None).unwrap();

        let ids: Vec<&str> = outcome.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4", "5"]);

        // Missing id, missing category, duplicate id. The blank row is silent.
        assert_eq!(outcome.rejected.len(), 3);
        assert_eq!(outcome.rejected[0].kind, IssueKind::MalformedRecord);
        assert_eq!(outcome.rejected[0].row, Some(4));
        assert_eq!(outcome.rejected[1].kind, IssueKind::MalformedRecord);
        assert_eq!(outcome.rejected[2].kind, IssueKind::DuplicateId);

        // Unknown categories are left for the emitter to report.
        assert_eq!(
            outcome.records[2].category,
            RecordCategory::Unknown("Unknown".into())
        );
    }

    #[test]
    fn default_category_from_origin() {
        let csv = "id,question,answer\nq1,Are you insured?,Fully.\n";
        let outcome = load_str(csv, SourceFormat::Csv, "faqs.csv", Some(Category::Faq)).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].category, RecordCategory::Known(Category::Faq));
        assert_eq!(outcome.records[0].title, "Are you insured?");
    }

    #[test]
    fn load_directory_uses_file_stems_and_sorts() {
        let dir = temp_dir();
        std::fs::write(
            dir.join("services.csv"),
            "id,name,description\ns1,Roofing,New roofs and repairs.\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("FAQs.json"),
            r#"[{"id": "f1", "question": "Free estimates?", "answer": "Always."}]"#,
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let outcome = load(&dir).unwrap();
        assert_eq!(outcome.files.len(), 2);
        // "FAQs.json" sorts before "services.csv".
        assert_eq!(outcome.records[0].category, RecordCategory::Known(Category::Faq));
        assert_eq!(outcome.records[1].category, RecordCategory::Known(Category::Service));
        assert_eq!(outcome.records[1].title, "Roofing");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn duplicate_ids_across_files_are_rejected() {
        let dir = temp_dir();
        std::fs::write(dir.join("a.csv"), "id,category,title\nx,Service,One\n").unwrap();
        std::fs::write(dir.join("b.csv"), "id,category,title\nx,Service,Two\n").unwrap();

        let outcome = load(&dir).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].title, "One");
        assert_eq!(outcome.rejected[0].kind, IssueKind::DuplicateId);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load(Path::new("content.xlsx")).unwrap_err();
        assert!(err.to_string().contains("unsupported input"));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = temp_dir();
        assert!(load(&dir).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load(Path::new("/nonexistent/aidata/master.csv")).unwrap_err();
        assert!(matches!(err, AiDataError::Io { .. }));
    }
}
