//! Analysis result types shared by the generator, the CLI and the web API

use leaflet_inventory::{FileStructure, ProjectMetadata};
use serde::{Deserialize, Serialize};

/// How a dependency is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Production,
    Development,
    Peer,
    /// Anything else the model comes up with
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type", default = "default_dependency_kind")]
    pub kind: DependencyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_dependency_kind() -> DependencyKind {
    DependencyKind::Production
}

/// Kind of documentation section proposed by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Readme,
    Api,
    Setup,
    Contributing,
    Inline,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationSection {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// 1 (highest) to 5
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

fn default_priority() -> u8 {
    3
}

/// Fields the model may fill in; everything is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiInsights {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub technology: Option<Vec<String>>,
    pub entry_points: Option<Vec<String>>,
    pub dependencies: Option<Vec<Dependency>>,
    pub documentation: Option<Vec<DocumentationSection>>,
}

/// Complete analysis of one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub project_name: String,
    pub description: String,
    pub technology: Vec<String>,
    pub structure: FileStructure,
    pub dependencies: Vec<Dependency>,
    pub entry_points: Vec<String>,
    pub documentation: Vec<DocumentationSection>,
    pub metadata: ProjectMetadata,
}

pub const DEFAULT_DESCRIPTION: &str = "No description available";

impl ProjectAnalysis {
    /// Merge model output with the inventory, filling gaps with defaults
    pub fn compile(
        insights: AiInsights,
        structure: FileStructure,
        metadata: ProjectMetadata,
        fallback_name: &str,
    ) -> Self {
        Self {
            project_name: insights
                .project_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
            description: insights
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            technology: insights.technology.unwrap_or_default(),
            structure,
            dependencies: insights.dependencies.unwrap_or_default(),
            entry_points: insights.entry_points.unwrap_or_default(),
            documentation: insights.documentation.unwrap_or_default(),
            metadata,
        }
    }

    /// Sections of one kind, highest priority first
    pub fn sections(&self, kind: SectionKind) -> Vec<&DocumentationSection> {
        let mut sections: Vec<_> = self
            .documentation
            .iter()
            .filter(|section| section.kind == kind)
            .collect();
        sections.sort_by_key(|section| section.priority);
        sections
    }
}

/// Outcome of a documentation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProjectAnalysis>,
    /// Prose documentation written by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Elapsed wall time in milliseconds
    pub processing_time: u64,
}

impl AnalysisResult {
    pub fn succeeded(data: ProjectAnalysis, documentation: String, processing_time: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            documentation: Some(documentation),
            error: None,
            processing_time,
        }
    }

    pub fn failed(error: impl Into<String>, processing_time: u64) -> Self {
        Self {
            success: false,
            data: None,
            documentation: None,
            error: Some(error.into()),
            processing_time,
        }
    }
}
