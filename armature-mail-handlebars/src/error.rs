//! Error types for the mail template adapter

use std::path::PathBuf;
use thiserror::Error;

/// Result type for template adapter operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Stage of the render pipeline.
///
/// A render call moves through these stages in order; `LoadingPartials` and
/// `Inlining` are skipped when not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Resolving,
    Compiling,
    LoadingPartials,
    Rendering,
    Inlining,
    Done,
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenderStage::Resolving => "resolving",
            RenderStage::Compiling => "compiling",
            RenderStage::LoadingPartials => "loading partials",
            RenderStage::Rendering => "rendering",
            RenderStage::Inlining => "inlining",
            RenderStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while producing the HTML body of a mail
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template file missing or unreadable
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template (or partial) source failed to compile
    #[error("Failed to compile template '{key}' ({}): {source}", path.display())]
    Compile {
        key: String,
        path: PathBuf,
        #[source]
        source: handlebars::TemplateError,
    },

    /// A partial listed by discovery could not be read
    #[error("Failed to load partial {}: {source}", path.display())]
    PartialLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template compiled but failed during evaluation
    #[error("Failed to render template '{key}': {source}")]
    Render {
        key: String,
        #[source]
        source: handlebars::RenderError,
    },

    /// The CSS inliner rejected the rendered markup
    #[error("CSS inlining failed: {0}")]
    CssInlining(String),

    /// Invalid adapter or mailer configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking task was cancelled or panicked
    #[error("Render task failed: {0}")]
    Task(String),
}

impl TemplateError {
    /// Pipeline stage in which this error occurred.
    pub fn stage(&self) -> RenderStage {
        match self {
            Self::Read { .. } | Self::Compile { .. } => RenderStage::Compiling,
            Self::PartialLoad { .. } => RenderStage::LoadingPartials,
            Self::Render { .. } | Self::Task(_) => RenderStage::Rendering,
            Self::CssInlining(_) => RenderStage::Inlining,
            Self::Config(_) => RenderStage::Resolving,
        }
    }

    /// Check if the error came from the filesystem.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::PartialLoad { .. })
    }
}
