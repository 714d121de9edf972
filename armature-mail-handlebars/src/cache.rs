//! Compile cache
//!
//! Compiled templates are stored by key the first time they are requested and
//! returned unchanged afterwards. Entries are never re-validated against the
//! file on disk; the only way to drop one is an explicit
//! [`CompileCache::invalidate`] or [`CompileCache::clear`].

use crate::{config::CompileOptions, source::TemplateSource, Result, TemplateError};
use handlebars::Template;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A compiled template and the options it was compiled with
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    /// Cache key
    pub key: String,

    /// File the template was read from
    pub path: PathBuf,

    /// Parsed template
    pub template: Template,

    /// Options in effect when this template renders
    pub options: CompileOptions,
}

/// Append-only map from key to compiled template
#[derive(Debug, Default)]
pub struct CompileCache {
    entries: HashMap<String, Arc<CompiledTemplate>>,
}

impl CompileCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the template cached under `key`, compiling it from `path` on a
    /// miss. `options` only matter on a miss.
    pub fn get_or_compile(
        &mut self,
        key: &str,
        path: &Path,
        options: CompileOptions,
        source: &dyn TemplateSource,
    ) -> Result<Arc<CompiledTemplate>> {
        if let Some(compiled) = self.entries.get(key) {
            debug!(template = key, "Compile cache hit");
            return Ok(Arc::clone(compiled));
        }

        let content = source
            .read_to_string(path)
            .map_err(|source| TemplateError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let template = Template::compile(&content).map_err(|source| TemplateError::Compile {
            key: key.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

        let compiled = Arc::new(CompiledTemplate {
            key: key.to_string(),
            path: path.to_path_buf(),
            template,
            options,
        });
        self.entries.insert(key.to_string(), Arc::clone(&compiled));

        debug!(template = key, path = %path.display(), "Compiled template");
        Ok(compiled)
    }

    /// Cached template for `key`, if any
    pub fn get(&self, key: &str) -> Option<Arc<CompiledTemplate>> {
        self.entries.get(key).cloned()
    }

    /// Check if a key is cached
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Cached keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of cached templates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop one entry so the next request recompiles it
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
