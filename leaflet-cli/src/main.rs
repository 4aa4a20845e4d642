//! Leaflet CLI - Command-line interface for Leaflet
//!
//! Analyzes a project, asks the model to describe it and writes the
//! documentation next to a set of Markdown templates.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use leaflet_core::{
    default_config_path, init_logging, log_operation_error, log_operation_start,
    log_operation_success, DocumentationConfig, LeafletConfig, LogFormat, LoggingConfig,
    OutputFormat, Tone, Verbosity,
};
use leaflet_docs::{
    format_directory_tree, AnalyzerProvider, DocumentationGenerator, GeminiProvider,
    ProjectAnalysis,
};
use leaflet_inventory::{PathMatcher, ProjectAnalyzer, ProjectInventory};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "leaflet")]
#[command(about = "AI-assisted documentation generator for code projects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, global = true)]
    verbose: bool,

    /// Log output format (json, pretty, compact); overrides [logging].format
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a project and generate documentation
    Analyze {
        /// Project directory
        path: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./leaflet-docs")]
        output: PathBuf,

        /// Output format (json, markdown, html)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Documentation tone (technical, friendly, formal)
        #[arg(short, long)]
        tone: Option<Tone>,

        /// Level of detail (minimal, standard, detailed)
        #[arg(short = 'v', long)]
        verbosity: Option<Verbosity>,

        /// Include API documentation
        #[arg(long)]
        api_docs: bool,

        /// Include a setup guide
        #[arg(long)]
        setup_guide: bool,

        /// Suggest inline code comments
        #[arg(long)]
        inline_comments: bool,

        /// Also write README/API/SETUP/CONTRIBUTING templates
        #[arg(long)]
        templates: bool,

        /// Gemini API key (defaults to GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Generate README/API/SETUP/CONTRIBUTING templates
    Templates {
        /// Project directory
        path: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./leaflet-templates")]
        output: PathBuf,

        /// Gemini API key (defaults to GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Inventory a project without calling the model
    Inventory {
        /// Project directory
        path: PathBuf,

        /// Extra ignore pattern, may be repeated
        #[arg(short, long = "ignore")]
        ignore: Vec<String>,

        /// Byte budget for the source sample
        #[arg(long)]
        sample_budget: Option<usize>,

        /// Print the source sample sent to the model
        #[arg(long)]
        show_sample: bool,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

/// `[logging]` from the config file with command-line flags applied on top
fn logging_config(config: &LeafletConfig, verbose: bool, format: Option<LogFormat>) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if verbose {
        logging = logging.verbose();
    }
    if let Some(format) = format {
        logging.format = format;
    }
    logging
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = LeafletConfig::load(cli.config.as_deref())?;

    init_logging(&logging_config(&config, cli.verbose, cli.log_format))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    info!("Starting Leaflet CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze {
            path,
            output,
            format,
            tone,
            verbosity,
            api_docs,
            setup_guide,
            inline_comments,
            templates,
            api_key,
            model,
        } => {
            let mut doc_config = config.documentation.clone();
            if let Some(format) = format {
                doc_config.output_format = format;
            }
            if let Some(tone) = tone {
                doc_config.tone = tone;
            }
            if let Some(verbosity) = verbosity {
                doc_config.verbosity = verbosity;
            }
            doc_config.include_api_docs |= api_docs;
            doc_config.include_setup_guide |= setup_guide;
            doc_config.include_inline |= inline_comments;

            let options = AnalyzeOptions {
                doc_config,
                templates,
                api_key,
                model,
            };
            handle_analyze(&path, &output, options, &config).await?;
        }
        Commands::Templates {
            path,
            output,
            api_key,
        } => {
            handle_templates(&path, &output, api_key, &config).await?;
        }
        Commands::Inventory {
            path,
            ignore,
            sample_budget,
            show_sample,
        } => {
            let budget = sample_budget.unwrap_or(config.inventory.sample_budget);
            handle_inventory(&path, ignore, budget, show_sample, &config).await?;
        }
        Commands::Config {
            show,
            init,
            validate,
        } => {
            handle_config(cli.config.as_deref(), show, init, validate)?;
        }
    }

    Ok(())
}

struct AnalyzeOptions {
    doc_config: DocumentationConfig,
    templates: bool,
    api_key: Option<String>,
    model: Option<String>,
}

fn build_generator(
    path: &Path,
    doc_config: DocumentationConfig,
    api_key: Option<String>,
    model: Option<String>,
    config: &LeafletConfig,
) -> Result<DocumentationGenerator> {
    let mut ai_config = config.ai.to_ai_config();
    if let Some(key) = api_key {
        ai_config.api_key = key;
    }
    if let Some(model) = model {
        ai_config.model = model;
    }
    if !ai_config.has_api_key() {
        bail!("A Gemini API key is required. Set GEMINI_API_KEY or pass --api-key");
    }

    let analyzer = GeminiProvider::new().create(&ai_config)?;
    let generator = DocumentationGenerator::new(path, analyzer, doc_config)?
        .with_ignore_patterns(&config.inventory.extra_ignore_patterns)?
        .with_sample_budget(config.inventory.sample_budget);
    Ok(generator)
}

/// Run the generator, turning a failed result into an error
async fn run_generator(generator: &DocumentationGenerator) -> Result<(ProjectAnalysis, Option<String>)> {
    let result = generator.generate_documentation().await;
    match result.data {
        Some(analysis) if result.success => {
            println!("⏱️  Finished in {} ms", result.processing_time);
            Ok((analysis, result.documentation))
        }
        _ => bail!(
            "Analysis failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}

async fn handle_analyze(
    path: &Path,
    output: &Path,
    options: AnalyzeOptions,
    config: &LeafletConfig,
) -> Result<()> {
    log_operation_start!("cli_analyze", path = %path.display());
    println!("🔍 Analyzing {}...", path.display());

    let format = options.doc_config.output_format;
    let generator = build_generator(path, options.doc_config, options.api_key, options.model, config)?;

    let (analysis, documentation) = run_generator(&generator).await.map_err(|e| {
        log_operation_error!("cli_analyze", e, path = %path.display());
        e
    })?;

    let output_file = output.join(format!("analysis.{}", format.extension()));
    generator
        .save_documentation(&analysis, documentation.as_deref(), &output_file)
        .await
        .with_context(|| format!("Failed to save {}", output_file.display()))?;

    print_summary(&analysis);
    println!("📄 Documentation: {}", output_file.display());

    if options.templates {
        let written = generator
            .generate_templates(&analysis, &output.join("templates"))
            .await?;
        println!("📝 Templates:");
        for file in written {
            println!("  {}", file.display());
        }
    }

    log_operation_success!("cli_analyze", project = %analysis.project_name);
    Ok(())
}

async fn handle_templates(
    path: &Path,
    output: &Path,
    api_key: Option<String>,
    config: &LeafletConfig,
) -> Result<()> {
    println!("🔍 Analyzing {}...", path.display());

    let generator = build_generator(
        path,
        DocumentationConfig::full_templates(),
        api_key,
        None,
        config,
    )?;
    let (analysis, _) = run_generator(&generator).await?;

    let written = generator.generate_templates(&analysis, output).await?;
    println!("✅ Generated {} templates in {}", written.len(), output.display());
    for file in written {
        println!("  {}", file.display());
    }
    Ok(())
}

async fn handle_inventory(
    path: &Path,
    ignore: Vec<String>,
    sample_budget: usize,
    show_sample: bool,
    config: &LeafletConfig,
) -> Result<()> {
    let mut patterns = config.inventory.extra_ignore_patterns.clone();
    patterns.extend(ignore);

    let analyzer = ProjectAnalyzer::with_matcher(path, PathMatcher::with_patterns(&patterns)?)?;
    let inventory = analyzer.analyze_project().await?;
    print_inventory(&inventory);

    let sample = analyzer.source_sample(sample_budget).await?;
    println!(
        "\n🧪 Source sample: {} bytes from {} files{}",
        sample.content_bytes,
        sample.files.len(),
        if sample.truncated { " (truncated)" } else { "" }
    );
    if show_sample {
        println!("{}", sample.text);
    }
    Ok(())
}

fn print_inventory(inventory: &ProjectInventory) {
    let structure = &inventory.file_structure;
    println!("📁 Project structure:\n");
    print!("{}", format_directory_tree(&structure.root));

    println!("\n📊 {} files, {} lines", structure.total_files, structure.total_lines);
    for (extension, lines) in &structure.language_breakdown {
        let label = if extension.is_empty() { "(none)" } else { extension.as_str() };
        println!("  {label:<10} {lines}");
    }

    let metadata = &inventory.metadata;
    println!("\n📋 Version {}", metadata.version);
    if let Some(license) = &metadata.license {
        println!("   License: {license}");
    }
    if let Some(repository) = &metadata.repository {
        println!("   Repository: {repository}");
    }
    if metadata.has_version_control {
        println!("   Under git version control");
    }

    if !inventory.warnings.is_empty() {
        println!("\n⚠️  {} paths skipped:", inventory.warnings.len());
        for warning in &inventory.warnings {
            println!("  {:?} {}: {}", warning.kind, warning.path.display(), warning.message);
        }
    }
}

fn print_summary(analysis: &ProjectAnalysis) {
    println!("\n✅ {}", analysis.project_name);
    println!("   {}", analysis.description);
    if !analysis.technology.is_empty() {
        println!("   Technologies: {}", analysis.technology.join(", "));
    }
    println!(
        "   {} files, {} lines, {} dependencies",
        analysis.structure.total_files,
        analysis.structure.total_lines,
        analysis.dependencies.len()
    );
}

fn handle_config(path: Option<&Path>, show: bool, init: bool, validate: bool) -> Result<()> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    if init {
        if config_path.exists() {
            bail!("Configuration already exists at {}", config_path.display());
        }
        LeafletConfig::default().save_to_file(&config_path)?;
        println!("✅ Configuration initialized at: {}", config_path.display());
        println!("📝 Set GEMINI_API_KEY in your environment or a .env file.");
    }

    if show {
        let mut config = LeafletConfig::load(path)?;
        if config.ai.api_key.is_some() {
            config.ai.api_key = Some("********".to_string());
        }
        println!("📋 Current configuration ({}):", config_path.display());
        println!("{}", toml::to_string_pretty(&config)?);
    }

    if validate {
        let config = LeafletConfig::load(path)?;
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {e}");
                return Err(e.into());
            }
        }
    }

    if !(init || show || validate) {
        println!("Nothing to do. Use --show, --init or --validate.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_options() {
        let cli = Cli::try_parse_from([
            "leaflet", "analyze", "./app", "-f", "html", "-t", "formal", "-v", "detailed",
            "--api-docs", "--templates",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                path,
                format,
                tone,
                verbosity,
                api_docs,
                setup_guide,
                templates,
                ..
            } => {
                assert_eq!(path, PathBuf::from("./app"));
                assert_eq!(format, Some(OutputFormat::Html));
                assert_eq!(tone, Some(Tone::Formal));
                assert_eq!(verbosity, Some(Verbosity::Detailed));
                assert!(api_docs && templates && !setup_guide);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["leaflet", "analyze", ".", "-f", "pdf"]).is_err());
    }

    #[test]
    fn inventory_collects_repeated_ignores() {
        let cli = Cli::try_parse_from([
            "leaflet", "inventory", ".", "--ignore", "*.md", "-i", "docs/**", "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Inventory { ignore, .. } => assert_eq!(ignore, vec!["*.md", "docs/**"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn log_format_flag_overrides_config_file() {
        let cli = Cli::try_parse_from([
            "leaflet", "--log-format", "json", "--verbose", "config", "--show",
        ])
        .unwrap();
        let mut config = LeafletConfig::default();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_thread = true;

        let logging = logging_config(&config, cli.verbose, cli.log_format);

        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.level, "debug");
        assert!(logging.include_thread);
        assert_eq!(logging_config(&config, false, None).format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_unknown_log_format() {
        let parsed = Cli::try_parse_from(["leaflet", "--log-format", "xml", "config", "--show"]);
        assert!(parsed.is_err());
    }
}
