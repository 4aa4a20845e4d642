//! Markdown templates built from a compiled analysis

use crate::types::{ProjectAnalysis, SectionKind};
use leaflet_inventory::DirectoryNode;
use std::fmt::Write;

/// Indented listing of a tree, one node per line.
///
/// Directories are marked 📁 with a trailing `/`, files 📄; each level adds two
/// spaces of indentation.
pub fn format_directory_tree(root: &DirectoryNode) -> String {
    let mut out = String::new();
    for (depth, node) in root.walk() {
        let indent = "  ".repeat(depth);
        if node.is_directory() {
            let _ = writeln!(out, "{indent}📁 {}/", node.name);
        } else {
            let _ = writeln!(out, "{indent}📄 {}", node.name);
        }
    }
    out
}

/// Build commands to suggest, based on the manifest at the project root
struct Toolchain {
    install: &'static str,
    develop: &'static str,
    build: &'static str,
    test: &'static str,
    prerequisites: &'static str,
}

const CARGO: Toolchain = Toolchain {
    install: "cargo fetch",
    develop: "cargo run",
    build: "cargo build --release",
    test: "cargo test",
    prerequisites: "- Rust (stable) and Cargo",
};

const NPM: Toolchain = Toolchain {
    install: "npm install",
    develop: "npm run dev",
    build: "npm run build",
    test: "npm test",
    prerequisites: "- Node.js (version 16 or higher)\n- npm or yarn",
};

const PYTHON: Toolchain = Toolchain {
    install: "pip install -r requirements.txt",
    develop: "python -m <package>",
    build: "python -m build",
    test: "pytest",
    prerequisites: "- Python 3 and pip",
};

const GO: Toolchain = Toolchain {
    install: "go mod download",
    develop: "go run .",
    build: "go build ./...",
    test: "go test ./...",
    prerequisites: "- Go toolchain",
};

fn detect_toolchain(analysis: &ProjectAnalysis) -> &'static Toolchain {
    let root = &analysis.structure.root;
    if root.child("Cargo.toml").is_some() {
        &CARGO
    } else if root.child("go.mod").is_some() {
        &GO
    } else if root.child("requirements.txt").is_some() || root.child("pyproject.toml").is_some() {
        &PYTHON
    } else {
        &NPM
    }
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- Not detected".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sections_of(analysis: &ProjectAnalysis, kind: SectionKind) -> String {
    analysis
        .sections(kind)
        .iter()
        .map(|section| format!("### {}\n\n{}", section.title, section.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn readme_template(analysis: &ProjectAnalysis) -> String {
    let tools = detect_toolchain(analysis);
    format!(
        "# {name}

{description}

## Features

{features}

## Quick Start

```bash
# Installation
{install}

# Development
{develop}

# Build
{build}
```

## Project Structure

```
{tree}```

## Documentation

- [API Documentation](./API.md)
- [Setup Guide](./SETUP.md)
- [Contributing](./CONTRIBUTING.md)

## License

{license}
",
        name = analysis.project_name,
        description = analysis.description,
        features = bullet_list(&analysis.technology),
        install = tools.install,
        develop = tools.develop,
        build = tools.build,
        tree = format_directory_tree(&analysis.structure.root),
        license = analysis.metadata.license.as_deref().unwrap_or("MIT"),
    )
}

pub fn api_template(analysis: &ProjectAnalysis) -> String {
    let entry_points = if analysis.entry_points.is_empty() {
        "- Not detected".to_string()
    } else {
        analysis
            .entry_points
            .iter()
            .map(|entry| format!("- `{entry}`"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let dependencies = if analysis.dependencies.is_empty() {
        "- None detected".to_string()
    } else {
        analysis
            .dependencies
            .iter()
            .map(|dep| {
                format!(
                    "- **{}** ({}) - {}",
                    dep.name,
                    if dep.version.is_empty() { "any" } else { &dep.version },
                    dep.description.as_deref().unwrap_or("No description")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# API Documentation

## Overview

This document describes the API for {name}.

## Entry Points

{entry_points}

## Dependencies

{dependencies}

## Architecture

The project uses the following technologies:
{technology}

## Key Components

{components}
",
        name = analysis.project_name,
        technology = bullet_list(&analysis.technology),
        components = sections_of(analysis, SectionKind::Api),
    )
}

pub fn setup_template(analysis: &ProjectAnalysis) -> String {
    let tools = detect_toolchain(analysis);
    let clone_url = analysis
        .metadata
        .repository
        .as_deref()
        .unwrap_or("<repository-url>");

    format!(
        "# Setup Guide

## Prerequisites

{prerequisites}

## Installation

1. Clone the repository:
```bash
git clone {clone_url}
cd {name}
```

2. Install dependencies:
```bash
{install}
```

3. Start a development build:
```bash
{develop}
```

4. Run the tests:
```bash
{test}
```

## Configuration

{configuration}
",
        prerequisites = tools.prerequisites,
        name = analysis.project_name,
        install = tools.install,
        develop = tools.develop,
        test = tools.test,
        configuration = sections_of(analysis, SectionKind::Setup),
    )
}

pub fn contributing_template(analysis: &ProjectAnalysis) -> String {
    let tools = detect_toolchain(analysis);
    format!(
        "# Contributing

Thank you for your interest in contributing to {name}!

## Development Setup

1. Fork the repository
2. Clone your fork
3. Install dependencies: `{install}`
4. Create a feature branch: `git checkout -b feature/your-feature`
5. Make your changes
6. Run tests: `{test}`
7. Commit your changes: `git commit -m 'Add feature'`
8. Push to your fork: `git push origin feature/your-feature`
9. Create a Pull Request

## Code Style

- Follow the existing code style
- Add tests for new features
- Update documentation as needed

## Project Structure

```
{tree}```

## Questions?

Open an issue or reach out to the maintainers.
",
        name = analysis.project_name,
        install = tools.install,
        test = tools.test,
        tree = format_directory_tree(&analysis.structure.root),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_analysis;

    #[test]
    fn tree_listing_uses_markers_and_indentation() {
        let analysis = sample_analysis();

        assert_eq!(
            format_directory_tree(&analysis.structure.root),
            "📁 widget/\n  📄 Cargo.toml\n  📁 src/\n    📄 main.rs\n"
        );
    }

    #[test]
    fn readme_uses_detected_toolchain_and_license() {
        let readme = readme_template(&sample_analysis());

        assert!(readme.starts_with("# widget\n\nA tiny widget server"));
        assert!(readme.contains("cargo build --release"));
        assert!(readme.contains("- Rust\n- axum"));
        assert!(readme.contains("## License\n\nApache-2.0"));
    }

    #[test]
    fn api_template_lists_entry_points_and_api_sections() {
        let api = api_template(&sample_analysis());

        assert!(api.contains("- `src/main.rs`"));
        assert!(api.contains("- **tokio** (1) - async runtime"));
        assert!(api.contains("### Routes\n\nGET /widgets"));
        assert!(!api.contains("### Configuration"));
    }

    #[test]
    fn setup_template_includes_setup_sections() {
        let setup = setup_template(&sample_analysis());

        assert!(setup.contains("cd widget"));
        assert!(setup.contains("### Configuration\n\nSet PORT"));
    }
}
