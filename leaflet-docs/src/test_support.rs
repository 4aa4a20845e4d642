//! Fixtures shared by unit tests

use crate::types::*;
use chrono::Utc;
use leaflet_inventory::{DirectoryNode, FileStructure, ProjectMetadata};

pub fn sample_analysis() -> ProjectAnalysis {
    let root = DirectoryNode::directory(
        "widget",
        "/work/widget",
        vec![
            DirectoryNode::file("Cargo.toml", "/work/widget/Cargo.toml"),
            DirectoryNode::directory(
                "src",
                "/work/widget/src",
                vec![DirectoryNode::file("main.rs", "/work/widget/src/main.rs")],
            ),
        ],
    );

    ProjectAnalysis {
        project_name: "widget".to_string(),
        description: "A tiny widget server".to_string(),
        technology: vec!["Rust".to_string(), "axum".to_string()],
        structure: FileStructure {
            root,
            total_files: 2,
            total_lines: 30,
            language_breakdown: [(".toml".to_string(), 10), (".rs".to_string(), 20)]
                .into_iter()
                .collect(),
        },
        dependencies: vec![Dependency {
            name: "tokio".to_string(),
            version: "1".to_string(),
            kind: DependencyKind::Production,
            description: Some("async runtime".to_string()),
        }],
        entry_points: vec!["src/main.rs".to_string()],
        documentation: vec![
            DocumentationSection {
                kind: SectionKind::Api,
                title: "Routes".to_string(),
                content: "GET /widgets".to_string(),
                priority: 1,
                files: Some(vec!["src/main.rs".to_string()]),
            },
            DocumentationSection {
                kind: SectionKind::Setup,
                title: "Configuration".to_string(),
                content: "Set PORT".to_string(),
                priority: 2,
                files: None,
            },
        ],
        metadata: ProjectMetadata {
            created_at: Utc::now(),
            last_modified: Utc::now(),
            version: "0.1.0".to_string(),
            license: Some("Apache-2.0".to_string()),
            repository: None,
            author: None,
            has_version_control: false,
        },
    }
}
