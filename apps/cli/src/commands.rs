//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use aidata_core::pipeline::{GenerateConfig, GenerateResult, ProgressReporter};
use aidata_core::{VerifyReport, verify_manifest};
use aidata_schema::{EmitContext, TemplateRegistry};
use aidata_shared::{
    AppConfig, Category, LinkBases, init_config, init_config_at, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// aidata: spreadsheet content to JSON-LD, markdown, and a link manifest.
#[derive(Parser)]
#[command(
    name = "aidata",
    version,
    about = "Turn tabular site content into schema.org JSON-LD, markdown documents, and a link manifest.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate schemas, documents, and the link manifest from a source.
    Generate {
        /// Source CSV/JSON file, or a directory of them.
        #[arg(short, long)]
        input: PathBuf,

        /// Output root (defaults to `[output].dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Remove previously generated `schemas/` and `docs/` first.
        #[arg(long)]
        clean: bool,

        /// Site (organization) name.
        #[arg(long)]
        site_name: Option<String>,

        /// Base of every canonical URL.
        #[arg(long)]
        canonical_base_url: Option<String>,

        /// `owner/name` of the publishing repository.
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repository: Option<String>,

        /// Branch used for raw URLs.
        #[arg(long)]
        branch: Option<String>,

        /// Config file (defaults to ./aidata.toml, then ~/.aidata/aidata.toml).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that every link in a generated manifest resolves to its artifact.
    Verify {
        /// Output root the manifest describes.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Manifest to check: index.json (default) or links.md.
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List supported categories and their templates.
    Categories {
        /// Config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init {
        /// Where to write it (defaults to ~/.aidata/aidata.toml).
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show resolved configuration.
    Show {
        /// Config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "aidata=info",
        1 => "aidata=debug",
        _ => "aidata=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            input,
            out,
            clean,
            site_name,
            canonical_base_url,
            repository,
            branch,
            config,
        } => {
            let mut app = resolve_config(config.as_deref())?;
            apply_overrides(
                &mut app,
                Overrides {
                    site_name,
                    canonical_base_url,
                    repository,
                    branch,
                },
            );
            cmd_generate(input, out, clean, app)
        }
        Command::Verify {
            out,
            manifest,
            config,
        } => cmd_verify(out, manifest.as_deref(), config.as_deref()),
        Command::Categories { config } => cmd_categories(config.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init { path } => cmd_config_init(path.as_deref()),
            ConfigAction::Show { config } => cmd_config_show(config.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

/// Flag values that take precedence over the config file.
struct Overrides {
    site_name: Option<String>,
    canonical_base_url: Option<String>,
    repository: Option<String>,
    branch: Option<String>,
}

fn apply_overrides(app: &mut AppConfig, overrides: Overrides) {
    if let Some(name) = overrides.site_name {
        app.site.name = name;
    }
    if let Some(base) = overrides.canonical_base_url {
        app.publish.canonical_base_url = Some(base);
    }
    if let Some(repo) = overrides.repository.filter(|r| !r.trim().is_empty()) {
        app.publish.repository = Some(repo);
    }
    if let Some(branch) = overrides.branch {
        app.publish.branch = branch;
    }
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

fn cmd_generate(input: PathBuf, out: Option<PathBuf>, clean: bool, app: AppConfig) -> Result<()> {
    let output_root = out.unwrap_or_else(|| PathBuf::from(&app.output.dir));
    let config = GenerateConfig {
        input,
        output_root,
        clean: clean || app.output.clean,
        app,
    };

    info!(
        input = %config.input.display(),
        out = %config.output_root.display(),
        clean = config.clean,
        "generating site data"
    );

    let reporter = CliProgress::new();
    let result = aidata_core::generate(&config, &reporter)?;
    let report = &result.report;

    println!();
    println!("  Site data generated.");
    println!("  Run:       {}", result.run_id);
    println!("  Records:   {} loaded, {} emitted", report.records_loaded, report.records_emitted);
    println!("  Schemas:   {}", report.schema_count);
    println!("  Documents: {}", report.document_count);
    println!("  Issues:    {}", report.issues.len());
    println!("  Path:      {}", result.output_root.display());
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    for issue in &report.issues {
        warn!(kind = ?issue.kind, "{}", issue.message);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

fn cmd_verify(out: Option<PathBuf>, manifest: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let app = resolve_config(config)?;
    let root = out.unwrap_or_else(|| PathBuf::from(&app.output.dir));

    // Only needed for links.md when index.json is absent.
    let canonical_base = LinkBases::try_from(&app.publish).ok().map(|b| b.canonical);

    let report = verify_manifest(&root, manifest, canonical_base.as_deref())?;
    print_verify_report(&report);

    if report.is_clean() {
        Ok(())
    } else {
        Err(eyre!(
            "{} of {} manifest links failed verification",
            report.problems.len(),
            report.checked
        ))
    }
}

fn print_verify_report(report: &VerifyReport) {
    println!();
    println!("  Manifest: {}", report.manifest.display());
    println!("  Checked:  {}", report.checked);
    for problem in &report.problems {
        println!("  [{:?}] {} ({})", problem.kind, problem.url, problem.detail);
    }
    if report.is_clean() {
        println!("  All links resolve.");
    }
    println!();
}

// ---------------------------------------------------------------------------
// categories
// ---------------------------------------------------------------------------

fn cmd_categories(config: Option<&Path>) -> Result<()> {
    let app = resolve_config(config)?;
    let ctx = EmitContext::new(app.site.clone());
    let registry = TemplateRegistry::new();

    for category in Category::DISPLAY_ORDER {
        let Some(template) = registry.get(category) else {
            continue;
        };
        let required: Vec<&str> = template.required_fields().iter().map(|f| f.name).collect();

        println!("{}", category.key());
        println!("  @type:    {}", template.schema_type(&ctx));
        println!("  folder:   schemas/{}/, docs/{}.md", category.bucket(), category.bucket());
        println!("  heading:  {}", app.heading_for(category));
        println!("  required: {}", required.join(", "));
        println!("  aliases:  {}", category.aliases().join(", "));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => {
            init_config_at(path)?;
            path.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn artifact_written(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
