//! Configuration for the mail template adapter
//!
//! Every option bag is a typed struct. Unknown keys are rejected when a
//! configuration is deserialized, so a typo in a TOML file fails loudly
//! instead of being ignored.

use crate::{Result, TemplateError};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Default template file extension
pub const DEFAULT_EXTENSION: &str = ".hbs";

/// How compiled templates are keyed in the compile cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKeyStrategy {
    /// Key by file name without directory or extension.
    ///
    /// `emails/welcome.hbs` and `legacy/welcome.hbs` share one cache entry.
    #[default]
    BaseName,
    /// Key by the full resolved template path.
    ResolvedPath,
}

/// Options handed to the CSS inliner
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InlineOptions {
    /// Keep `<style>` blocks after inlining
    pub keep_style_tags: bool,

    /// Keep `<link rel="stylesheet">` tags after inlining
    pub keep_link_tags: bool,

    /// Base URL used to resolve relative stylesheet links
    pub base_url: Option<String>,

    /// Fetch stylesheets referenced by `<link>` tags
    pub load_remote_stylesheets: bool,

    /// Extra CSS applied to every document
    pub extra_css: Option<String>,
}

/// CSS inlining settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CssInliningConfig {
    /// Run rendered markup through the inliner (default: true)
    pub enabled: bool,

    /// Options passed verbatim to the inliner
    pub options: InlineOptions,
}

impl Default for CssInliningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            options: InlineOptions::default(),
        }
    }
}

/// Adapter configuration, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    /// CSS inlining settings
    pub css_inlining: CssInliningConfig,

    /// Extension assumed when a template reference has none (default: ".hbs")
    #[serde(deserialize_with = "deserialize_extension")]
    pub extension: String,

    /// Compile cache keying
    pub cache_key: CacheKeyStrategy,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            css_inlining: CssInliningConfig::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            cache_key: CacheKeyStrategy::default(),
        }
    }
}

impl AdapterConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TemplateError::Config(format!("TOML parse error: {}", e)))
    }

    /// Enable or disable CSS inlining
    pub fn with_css_inlining(mut self, enable: bool) -> Self {
        self.css_inlining.enabled = enable;
        self
    }

    /// Set the options handed to the CSS inliner
    pub fn with_inline_options(mut self, options: InlineOptions) -> Self {
        self.css_inlining.options = options;
        self
    }

    /// Set the default template extension
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = normalize_extension(ext.into());
        self
    }

    /// Set the cache key strategy
    pub fn with_cache_key(mut self, strategy: CacheKeyStrategy) -> Self {
        self.cache_key = strategy;
        self
    }
}

/// Prefix a leading dot unless the extension is empty or already has one
pub fn normalize_extension(ext: String) -> String {
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

fn deserialize_extension<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(normalize_extension)
}

/// Options captured when a template is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Error on missing variables
    pub strict: bool,

    /// Disable HTML escaping
    pub no_escape: bool,
}

/// Partials directory settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialsOptions {
    pub dir: PathBuf,
}

/// Per-call runtime options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeOptions {
    /// Partials to register before rendering
    pub partials: Option<PartialsOptions>,

    /// Extra top-level fields merged into an object context
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl RuntimeOptions {
    /// Partials directory, if one is set and non-empty
    pub fn partials_dir(&self) -> Option<&Path> {
        self.partials
            .as_ref()
            .map(|p| p.dir.as_path())
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

/// Options supplied by the mailer with every render call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailerOptions {
    /// Base directory for relative template references
    pub dir: PathBuf,

    /// Compile options, used only when the template is not yet cached
    pub compile: CompileOptions,

    /// Runtime options
    pub options: RuntimeOptions,
}

impl MailerOptions {
    /// Create options with a template base directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Parse mailer options from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TemplateError::Config(format!("TOML parse error: {}", e)))
    }

    /// Set the partials directory
    pub fn with_partials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.partials = Some(PartialsOptions { dir: dir.into() });
        self
    }

    /// Add an extra data field
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.data.insert(key.into(), value.into());
        self
    }

    /// Set compile options
    pub fn with_compile_options(mut self, compile: CompileOptions) -> Self {
        self.compile = compile;
        self
    }
}
