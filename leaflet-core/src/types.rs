//! Core data type definitions shared by the CLI and the web server

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_SAMPLE_BUDGET: usize = 50_000;

/// Ignore patterns every inventory starts from
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules/**",
    "dist/**",
    "build/**",
    ".git/**",
    "*.log",
    "*.lock",
];

/// Extensions considered source code when building a source sample
pub const CODE_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".jsx", ".tsx", ".py", ".java", ".cpp", ".c", ".cs", ".go", ".rs", ".php",
    ".rb", ".swift", ".kt", ".scala",
];

/// Generative model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    /// API key; never serialized back to clients
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl AiConfig {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
    Html,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Html];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
        }
    }

    /// File extension used when saving documentation in this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Technical,
    Friendly,
    Formal,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Technical, Tone::Friendly, Tone::Formal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Technical => "technical",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Minimal,
    Standard,
    Detailed,
}

impl Verbosity {
    pub const ALL: [Verbosity; 3] = [Verbosity::Minimal, Verbosity::Standard, Verbosity::Detailed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Minimal => "minimal",
            Verbosity::Standard => "standard",
            Verbosity::Detailed => "detailed",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ident, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let supported: Vec<&str> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        format!(
                            "unsupported {} '{}' (expected one of: {})",
                            $field,
                            s,
                            supported.join(", ")
                        )
                    })
            }
        }
    };
}

display_and_parse!(OutputFormat, "output format");
display_and_parse!(Tone, "tone");
display_and_parse!(Verbosity, "verbosity");

/// How documentation should be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentationConfig {
    pub output_format: OutputFormat,
    pub template: String,
    pub include_inline: bool,
    pub include_api_docs: bool,
    pub include_setup_guide: bool,
    pub tone: Tone,
    pub verbosity: Verbosity,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Json,
            template: "default".to_string(),
            include_inline: false,
            include_api_docs: false,
            include_setup_guide: false,
            tone: Tone::Friendly,
            verbosity: Verbosity::Standard,
        }
    }
}

impl DocumentationConfig {
    /// Everything enabled, markdown output; used for template generation
    pub fn full_templates() -> Self {
        Self {
            output_format: OutputFormat::Markdown,
            include_inline: true,
            include_api_docs: true,
            include_setup_guide: true,
            ..Self::default()
        }
    }
}
