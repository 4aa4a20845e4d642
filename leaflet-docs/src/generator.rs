//! Documentation generator - inventory, model analysis and output files

use crate::ai::SemanticAnalyzer;
use crate::render::render_html_page;
use crate::templates::{api_template, contributing_template, readme_template, setup_template};
use crate::types::{AnalysisResult, ProjectAnalysis};
use leaflet_core::{
    storage_error, DocumentationConfig, LeafletResult, OutputFormat, DEFAULT_SAMPLE_BUDGET,
};
use leaflet_inventory::{PathMatcher, ProjectAnalyzer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{error, info};

/// Runs the full documentation pipeline for one project
pub struct DocumentationGenerator {
    analyzer: ProjectAnalyzer,
    ai: Arc<dyn SemanticAnalyzer>,
    config: DocumentationConfig,
    sample_budget: usize,
}

impl DocumentationGenerator {
    pub fn new<P: AsRef<Path>>(
        project_path: P,
        ai: Arc<dyn SemanticAnalyzer>,
        config: DocumentationConfig,
    ) -> LeafletResult<Self> {
        Ok(Self {
            analyzer: ProjectAnalyzer::new(project_path)?,
            ai,
            config,
            sample_budget: DEFAULT_SAMPLE_BUDGET,
        })
    }

    /// Ignore `patterns` in addition to the built-in list
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> LeafletResult<Self> {
        let matcher = PathMatcher::with_patterns(patterns)?;
        self.analyzer = ProjectAnalyzer::with_matcher(self.analyzer.root(), matcher)?;
        Ok(self)
    }

    pub fn with_sample_budget(mut self, budget: usize) -> Self {
        self.sample_budget = budget;
        self
    }

    pub fn config(&self) -> &DocumentationConfig {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        self.analyzer.root()
    }

    fn fallback_name(&self) -> String {
        self.analyzer
            .root()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    }

    async fn run(&self) -> LeafletResult<(ProjectAnalysis, String)> {
        info!(root = %self.analyzer.root().display(), "🔍 Analyzing project structure");
        let inventory = self.analyzer.analyze_project().await?;

        info!(budget = self.sample_budget, "📝 Extracting source code sample");
        let sample = self.analyzer.source_sample(self.sample_budget).await?;

        let insights = self
            .ai
            .analyze_project(&inventory.file_structure, &sample.text)
            .await?;

        info!("📊 Compiling project analysis");
        let analysis = ProjectAnalysis::compile(
            insights,
            inventory.file_structure,
            inventory.metadata,
            &self.fallback_name(),
        );

        let documentation = self
            .ai
            .generate_documentation(&analysis, &self.config)
            .await?;

        Ok((analysis, documentation))
    }

    /// Run the pipeline; failures are reported in the result, never raised.
    pub async fn generate_documentation(&self) -> AnalysisResult {
        let started = Instant::now();
        let outcome = self.run().await;
        let elapsed = started.elapsed().as_millis() as u64;

        match outcome {
            Ok((analysis, documentation)) => {
                info!(
                    project = %analysis.project_name,
                    processing_time_ms = elapsed,
                    "✅ Documentation generated"
                );
                AnalysisResult::succeeded(analysis, documentation, elapsed)
            }
            Err(e) => {
                e.log();
                error!(processing_time_ms = elapsed, "❌ Documentation generation failed");
                AnalysisResult::failed(e.to_string(), elapsed)
            }
        }
    }

    /// Write the analysis in the configured format.
    ///
    /// JSON writes the analysis itself. Markdown and HTML write the model's
    /// prose; when `documentation` is `None` it is requested again.
    pub async fn save_documentation(
        &self,
        analysis: &ProjectAnalysis,
        documentation: Option<&str>,
        output_path: &Path,
    ) -> LeafletResult<()> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = match self.config.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(analysis)?,
            format => {
                let markdown = match documentation {
                    Some(text) => text.to_string(),
                    None => self.ai.generate_documentation(analysis, &self.config).await?,
                };
                if format == OutputFormat::Html {
                    render_html_page(&analysis.project_name, &markdown)
                } else {
                    markdown
                }
            }
        };

        fs::write(output_path, content).await.map_err(|e| {
            storage_error!(
                format!("Failed to save documentation to {}", output_path.display()),
                "documentation_generator",
                e
            )
        })?;

        info!(path = %output_path.display(), "✅ Documentation saved");
        Ok(())
    }

    /// Write README, CONTRIBUTING and, when enabled, API and SETUP templates.
    pub async fn generate_templates(
        &self,
        analysis: &ProjectAnalysis,
        output_dir: &Path,
    ) -> LeafletResult<Vec<PathBuf>> {
        fs::create_dir_all(output_dir).await?;

        let mut templates = vec![("README.md", readme_template(analysis))];
        if self.config.include_api_docs {
            templates.push(("API.md", api_template(analysis)));
        }
        if self.config.include_setup_guide {
            templates.push(("SETUP.md", setup_template(analysis)));
        }
        templates.push(("CONTRIBUTING.md", contributing_template(analysis)));

        let mut written = Vec::with_capacity(templates.len());
        for (name, content) in templates {
            let path = output_dir.join(name);
            fs::write(&path, content).await.map_err(|e| {
                storage_error!(
                    format!("Failed to write template {}", path.display()),
                    "documentation_generator",
                    e
                )
            })?;
            written.push(path);
        }

        info!(dir = %output_dir.display(), count = written.len(), "✅ Templates generated");
        Ok(written)
    }
}

impl std::fmt::Debug for DocumentationGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentationGenerator")
            .field("root", &self.analyzer.root())
            .field("model", &self.ai.model_name())
            .field("config", &self.config)
            .field("sample_budget", &self.sample_budget)
            .finish()
    }
}
