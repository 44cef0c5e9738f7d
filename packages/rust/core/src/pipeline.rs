//! End-to-end `generate` pipeline: source → schemas + documents → index → report.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use aidata_markdown::render_documents;
use aidata_schema::{EmitContext, TemplateRegistry, emit_all};
use aidata_shared::{
    AiDataError, AppConfig, CURRENT_SCHEMA_VERSION, ContentRecord, LinkBases, LinkManifest,
    Result, RunId, RunReport,
};

use crate::assembler::{prepare_output, write_artifact, write_json};
use crate::index::{
    INDEX_JSON, LINKS_MD, SITEMAP_XML, build_manifest, document_entry, render_links_md,
    render_sitemap, schema_entry,
};

pub const REPORT_JSON: &str = "generation-report.json";

/// Configuration for the `generate` pipeline.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Source file or directory.
    pub input: PathBuf,
    /// Output root.
    pub output_root: PathBuf,
    /// Remove previously generated `schemas/` and `docs/` first.
    pub clean: bool,
    /// Site, publish, and heading settings.
    pub app: AppConfig,
}

/// Result of the `generate` pipeline.
#[derive(Debug)]
pub struct GenerateResult {
    pub run_id: RunId,
    pub output_root: PathBuf,
    pub manifest: LinkManifest,
    pub report: RunReport,
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each artifact is written.
    fn artifact_written(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn artifact_written(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Run the full `generate` pipeline.
///
/// 1. Load records
/// 2. Emit JSON-LD schemas
/// 3. Render markdown documents from the records that produced a schema
/// 4. Write schemas and documents
/// 5. Write `index.json`, `links.md`, `sitemap.xml`
/// 6. Write `generation-report.json`
///
/// Per-record problems are collected in the report. Configuration errors,
/// an input with no records, and write failures abort the run.
#[instrument(skip_all, fields(input = %config.input.display(), out = %config.output_root.display()))]
pub fn generate(config: &GenerateConfig, progress: &dyn ProgressReporter) -> Result<GenerateResult> {
    let start = Instant::now();
    let run_id = RunId::new();
    let root = &config.output_root;

    info!(%run_id, "starting generate pipeline");

    // Resolve URLs before touching the output directory.
    let bases = LinkBases::try_from(&config.app.publish)?;

    // --- Phase 1: Load ---
    progress.phase("Loading records");
    let loaded = aidata_source::load(&config.input)?;
    if loaded.records.is_empty() {
        return Err(AiDataError::validation(format!(
            "no records loaded from {} ({} rows rejected)",
            config.input.display(),
            loaded.rejected.len()
        )));
    }
    let mut issues = loaded.rejected;

    // --- Phase 2: Emit schemas ---
    progress.phase("Emitting schemas");
    let ctx = EmitContext::from_records(&config.app.site, &loaded.records);
    let emitted = emit_all(&loaded.records, &TemplateRegistry::new(), &ctx);
    let accepted: Vec<ContentRecord> = {
        let ids = emitted.emitted_ids();
        loaded
            .records
            .iter()
            .filter(|r| ids.contains(r.id.as_str()))
            .cloned()
            .collect()
    };
    issues.extend(emitted.issues);

    // --- Phase 3: Render documents ---
    progress.phase("Rendering documents");
    let documents = render_documents(&accepted, &config.app);

    // --- Phase 4: Write artifacts ---
    progress.phase("Writing artifacts");
    prepare_output(root, config.clean)?;

    let total = emitted.artifacts.len() + documents.len();
    let mut entries = Vec::with_capacity(total);

    for artifact in &emitted.artifacts {
        let meta = write_artifact(root, &artifact.path, &artifact.to_json_string()?)?;
        entries.push(schema_entry(artifact, &meta, &bases));
        progress.artifact_written(&meta.path, entries.len(), total);
    }
    for document in &documents {
        let meta = write_artifact(root, &document.path, &document.content)?;
        entries.push(document_entry(document, &meta, &bases));
        progress.artifact_written(&meta.path, entries.len(), total);
    }

    // --- Phase 5: Index ---
    progress.phase("Writing link manifest");
    let manifest = build_manifest(&config.app.site.name, &bases, entries);
    write_json(root, INDEX_JSON, &manifest)?;
    write_artifact(root, LINKS_MD, &render_links_md(&manifest, &config.app))?;
    write_artifact(root, SITEMAP_XML, &render_sitemap(&manifest))?;

    // --- Phase 6: Report ---
    let report = RunReport {
        schema_version: CURRENT_SCHEMA_VERSION,
        run_id: run_id.clone(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: Utc::now(),
        input: config.input.display().to_string(),
        records_loaded: loaded.records.len(),
        records_emitted: accepted.len(),
        schema_count: emitted.artifacts.len(),
        document_count: documents.len(),
        issues,
    };
    write_json(root, REPORT_JSON, &report)?;

    let result = GenerateResult {
        run_id,
        output_root: root.clone(),
        manifest,
        report,
        elapsed: start.elapsed(),
    };

    info!(
        schemas = result.report.schema_count,
        documents = result.report.document_count,
        issues = result.report.issues.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::verify_manifest;
    use aidata_shared::{ArtifactKind, IssueKind};
    use std::path::Path;
    use std::sync::Mutex;

    const MASTER_CSV: &str = "\
id,category,title,body,tags
1,Service,Custom Home Building,We build homes from the ground up.,homes|custom
2,FAQ,Do you offer warranties?,Ten years structural.,
3,FAQ,Do you pull permits?,,
4,Unknown,Mystery,Body,
5,Testimonial,Great crew,They finished on time.,
";

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aidata-pipeline-{label}-{}", uuid::Uuid::now_v7()))
    }

    fn setup(label: &str) -> (PathBuf, GenerateConfig) {
        let dir = temp_dir(label);
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("master.csv");
        std::fs::write(&input, MASTER_CSV).unwrap();

        let mut app = AppConfig::default();
        app.site.name = "Summit Builders".into();
        app.publish.repository = Some("Summit/site-data".into());
        app.headings.insert("service".into(), "Construction".into());

        let config = GenerateConfig {
            input,
            output_root: dir.join("out"),
            clean: false,
            app,
        };
        (dir, config)
    }

    fn read(root: &Path, rel: &str) -> String {
        std::fs::read_to_string(root.join(rel)).unwrap()
    }

    #[derive(Default)]
    struct RecordingProgress {
        phases: Mutex<Vec<String>>,
        written: Mutex<usize>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }
        fn artifact_written(&self, _path: &str, _current: usize, _total: usize) {
            *self.written.lock().unwrap() += 1;
        }
        fn done(&self, _result: &GenerateResult) {}
    }

    #[test]
    fn generate_writes_full_layout() {
        let (dir, config) = setup("layout");
        let progress = RecordingProgress::default();
        let result = generate(&config, &progress).unwrap();
        let out = &config.output_root;

        // Service, FAQ 2, Testimonial. FAQ 3 lacks an answer, record 4 is unknown.
        assert_eq!(result.report.records_loaded, 5);
        assert_eq!(result.report.schema_count, 3);
        assert_eq!(result.report.records_emitted, 3);
        // services, faqs, testimonials, knowledge
        assert_eq!(result.report.document_count, 4);
        assert_eq!(*progress.written.lock().unwrap(), 7);
        assert_eq!(progress.phases.lock().unwrap().len(), 5);

        for rel in [
            "schemas/services/custom-home-building.json",
            "schemas/faqs/do-you-offer-warranties.json",
            "schemas/testimonials/great-crew.json",
            "docs/services.md",
            "docs/knowledge.md",
            INDEX_JSON,
            LINKS_MD,
            SITEMAP_XML,
            REPORT_JSON,
        ] {
            assert!(out.join(rel).exists(), "missing {rel}");
        }

        let services = read(out, "docs/services.md");
        assert!(services.contains("# Construction\n\n## Custom Home Building\n"));
        assert!(services.contains("Tags: homes, custom\n"));

        let schema: serde_json::Value =
            serde_json::from_str(&read(out, "schemas/services/custom-home-building.json")).unwrap();
        assert_eq!(schema["@type"], "Service");
        assert_eq!(schema["identifier"], "1");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_category_is_excluded_and_logged_once() {
        let (dir, config) = setup("unknown");
        let result = generate(&config, &SilentProgress).unwrap();

        let unknown: Vec<_> = result
            .report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::UnknownCategory)
            .collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].record_id.as_deref(), Some("4"));

        assert!(
            result
                .manifest
                .entries
                .iter()
                .all(|e| !e.source_record_ids.contains(&"4".to_string()))
        );
        assert!(!read(&config.output_root, "docs/knowledge.md").contains("Mystery"));

        // The FAQ without an answer is reported and left out of the documents.
        assert!(
            result
                .report
                .issues
                .iter()
                .any(|i| i.kind == IssueKind::MissingField && i.record_id.as_deref() == Some("3"))
        );
        assert!(!read(&config.output_root, "docs/faqs.md").contains("permits"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn manifest_orders_schemas_then_documents() {
        let (dir, config) = setup("order");
        let result = generate(&config, &SilentProgress).unwrap();

        let kinds: Vec<ArtifactKind> = result.manifest.entries.iter().map(|e| e.kind).collect();
        let first_doc = kinds.iter().position(|k| *k == ArtifactKind::Document).unwrap();
        assert!(kinds[..first_doc].iter().all(|k| *k == ArtifactKind::Schema));
        assert!(kinds[first_doc..].iter().all(|k| *k == ArtifactKind::Document));

        let entry = &result.manifest.entries[0];
        assert_eq!(
            entry.canonical_url,
            "https://summit.github.io/site-data/schemas/services/custom-home-building.json"
        );
        assert_eq!(
            entry.raw_url,
            "https://raw.githubusercontent.com/Summit/site-data/main/schemas/services/custom-home-building.json"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn generated_manifest_round_trips_through_verify() {
        let (dir, config) = setup("verify");
        generate(&config, &SilentProgress).unwrap();
        let out = &config.output_root;

        let report = verify_manifest(out, None, None).unwrap();
        assert_eq!(report.checked, 7);
        assert!(report.is_clean(), "{:?}", report.problems);

        let report = verify_manifest(out, Some(&out.join(LINKS_MD)), None).unwrap();
        assert_eq!(report.checked, 7);
        assert!(report.is_clean(), "{:?}", report.problems);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let (dir, mut config) = setup("determinism");
        generate(&config, &SilentProgress).unwrap();
        let first = config.output_root.clone();
        config.output_root = dir.join("out-2");
        generate(&config, &SilentProgress).unwrap();

        for rel in [
            "docs/services.md",
            "docs/faqs.md",
            "docs/knowledge.md",
            "schemas/faqs/do-you-offer-warranties.json",
            LINKS_MD,
            SITEMAP_XML,
        ] {
            assert_eq!(read(&first, rel), read(&config.output_root, rel), "{rel} differs");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn clean_run_drops_stale_artifacts() {
        let (dir, mut config) = setup("clean");
        let stale = config.output_root.join("schemas/services/stale.json");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "{}").unwrap();

        config.clean = true;
        generate(&config, &SilentProgress).unwrap();
        assert!(!stale.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_input_is_a_validation_error() {
        let (dir, config) = setup("empty");
        std::fs::write(&config.input, "id,category,title\n").unwrap();
        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, AiDataError::Validation { .. }));
        assert!(!config.output_root.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_base_url_fails_before_writing() {
        let (dir, mut config) = setup("nobase");
        config.app.publish.repository = None;
        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, AiDataError::Config { .. }));
        assert!(!config.output_root.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
    #[test]
    fn output_root_that_is_a_file_is_fatal() {
        let (dir, config) = setup("rootfile");
        std::fs::write(&config.output_root, "not a directory").unwrap();

        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, AiDataError::Io { .. }), "{err}");
        assert!(!config.output_root.join(INDEX_JSON).exists());
        assert!(!dir.join(INDEX_JSON).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_failure_mid_run_leaves_no_manifest() {
        let (dir, config) = setup("midrun");
        std::fs::create_dir_all(&config.output_root).unwrap();
        // Schemas land first; the docs folder cannot be created.
        std::fs::write(config.output_root.join("docs"), "blocked").unwrap();

        let err = generate(&config, &SilentProgress).unwrap_err();
        assert!(matches!(err, AiDataError::Io { .. }), "{err}");
        assert!(config.output_root.join("schemas/services/custom-home-building.json").exists());
        for rel in [INDEX_JSON, LINKS_MD, SITEMAP_XML, REPORT_JSON] {
            assert!(!config.output_root.join(rel).exists(), "{rel} written after a failed write");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn team_rows_with_split_names_are_emitted() {
        let (dir, config) = setup("names");
        std::fs::write(
            &config.input,
            "id,category,first_name,last_name,bio\np1,Team,Jordan,Lee,Carpenter.\n",
        )
        .unwrap();

        let result = generate(&config, &SilentProgress).unwrap();
        assert_eq!(result.report.schema_count, 1);
        assert!(result.report.issues.is_empty(), "{:?}", result.report.issues);

        let schema: serde_json::Value =
            serde_json::from_str(&read(&config.output_root, "schemas/team/jordan-lee.json")).unwrap();
        assert_eq!(schema["@type"], "Person");
        assert_eq!(schema["name"], "Jordan Lee");
        assert!(read(&config.output_root, "docs/team.md").contains("\n## Jordan Lee\n"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn listing_categories_use_the_generic_template() {
        let (dir, config) = setup("generic");
        std::fs::write(
            &config.input,
            "\
id,category,title,outlet,budget
n1,Press,Builder of the Year,Valley Times,
c1,Case Studies,Riverside Remodel,,$120k
a1,Awards,Best of Houzz 2024,,
",
        )
        .unwrap();

        let result = generate(&config, &SilentProgress).unwrap();
        assert_eq!(result.report.schema_count, 3);

        let out = &config.output_root;
        let press: serde_json::Value =
            serde_json::from_str(&read(out, "schemas/press/builder-of-the-year.json")).unwrap();
        assert_eq!(press["@type"], "NewsArticle");
        assert_eq!(press["publisher"]["name"], "Valley Times");

        let case: serde_json::Value =
            serde_json::from_str(&read(out, "schemas/case-studies/riverside-remodel.json")).unwrap();
        assert_eq!(case["additionalProperty"][0]["name"], "budget");

        assert!(out.join("schemas/awards/best-of-houzz-2024.json").exists());
        assert!(read(out, "docs/press.md").contains("# In the News\n"));

        // Display order: awards before press before case studies.
        let knowledge = read(out, "docs/knowledge.md");
        let awards = knowledge.find("## Awards & Certifications").unwrap();
        let press = knowledge.find("## In the News").unwrap();
        let cases = knowledge.find("## Case Studies").unwrap();
        assert!(awards < press && press < cases);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
