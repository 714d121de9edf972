//! Handlebars engine wrapper
//!
//! Owns the helper/partial registry and the compile cache of one adapter.
//! Both sit behind a single mutex so that the cache check-and-insert, partial
//! re-registration and the render that depends on them happen as one step.
//!
//! Every compiled template is also registered in the registry under its key,
//! so any cached template can be embedded as a partial by other templates.

use crate::{
    cache::{CompileCache, CompiledTemplate},
    config::{AdapterConfig, CompileOptions, MailerOptions},
    helpers,
    partials::LoadedPartials,
    resolver,
    source::TemplateSource,
    Result, TemplateError,
};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

struct EngineState {
    registry: Handlebars<'static>,
    cache: CompileCache,
    partials: LoadedPartials,
    helpers: BTreeSet<String>,
}

impl EngineState {
    /// Look up or compile a template, publishing it to the registry on a miss
    fn compile(
        &mut self,
        key: &str,
        path: &Path,
        options: CompileOptions,
        source: &dyn TemplateSource,
    ) -> Result<Arc<CompiledTemplate>> {
        let cached = self.cache.contains(key);
        let compiled = self.cache.get_or_compile(key, path, options, source)?;

        // a partial holding this name gives it back on release
        if !cached && !self.partials.contains(key) {
            self.registry.register_template(key, compiled.template.clone());
        }
        Ok(compiled)
    }
}

/// Handlebars template engine with a per-instance compile cache
#[derive(Clone)]
pub struct HandlebarsEngine {
    state: Arc<Mutex<EngineState>>,
    source: Arc<dyn TemplateSource>,
    config: AdapterConfig,
}

impl HandlebarsEngine {
    /// Create an engine with the built-in helpers registered
    pub fn new(config: AdapterConfig, source: Arc<dyn TemplateSource>) -> Self {
        let mut registry = Handlebars::new();
        helpers::register_builtin_helpers(&mut registry);

        Self {
            state: Arc::new(Mutex::new(EngineState {
                registry,
                cache: CompileCache::new(),
                partials: LoadedPartials::new(),
                helpers: helpers::BUILTIN_HELPERS.iter().map(|name| name.to_string()).collect(),
            })),
            source,
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // the state stays consistent even if a helper panicked mid-render
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Compile `reference` if it is not cached yet
    pub fn compile(
        &self,
        reference: &str,
        base_dir: &Path,
        options: CompileOptions,
    ) -> Result<Arc<CompiledTemplate>> {
        let resolved = resolver::resolve(reference, base_dir, &self.config.extension);
        let key = resolved.cache_key(self.config.cache_key);

        self.lock()
            .compile(&key, &resolved.path, options, self.source.as_ref())
    }

    /// Resolve, compile, load partials and render `reference`.
    ///
    /// Blocks on file I/O; callers on an async runtime should use
    /// `spawn_blocking`.
    pub fn render(&self, reference: &str, context: Value, options: &MailerOptions) -> Result<String> {
        trace!(template = reference, "Resolving template");
        let resolved = resolver::resolve(reference, &options.dir, &self.config.extension);
        let key = resolved.cache_key(self.config.cache_key);

        let mut guard = self.lock();

        trace!(template = %key, "Compiling template");
        let compiled = guard.compile(&key, &resolved.path, options.compile, self.source.as_ref())?;

        let EngineState {
            registry,
            cache,
            partials,
            ..
        } = &mut *guard;

        match options.options.partials_dir() {
            Some(dir) => {
                trace!(dir = %dir.display(), "Loading partials");
                partials.reload(registry, cache, self.source.as_ref(), dir, &self.config.extension)?;
            }
            None => partials.clear(registry, cache),
        }

        trace!(template = %key, "Rendering template");
        apply_compile_options(registry, compiled.options);
        if partials.contains(&compiled.key) {
            // a partial of the same name replaced the registry entry
            registry.register_template(&compiled.key, compiled.template.clone());
        }

        let data = merge_data(context, &options.options.data);
        let html = registry
            .render(&compiled.key, &data)
            .map_err(|source| TemplateError::Render {
                key: compiled.key.clone(),
                source,
            })?;

        debug!(template = %key, bytes = html.len(), "Rendered template");
        Ok(html)
    }

    /// Register a partial
    pub fn register_partial(&self, name: &str, template: &str) -> Result<()> {
        self.lock()
            .registry
            .register_partial(name, template)
            .map_err(|source| TemplateError::Compile {
                key: name.to_string(),
                path: Path::new(name).to_path_buf(),
                source,
            })
    }

    /// Register a custom helper
    pub fn register_helper<F>(&self, name: &str, helper: F)
    where
        F: handlebars::HelperDef + Send + Sync + 'static,
    {
        let mut state = self.lock();
        state.registry.register_helper(name, Box::new(helper));
        state.helpers.insert(name.to_string());
    }

    /// Check if a helper is registered
    pub fn has_helper(&self, name: &str) -> bool {
        self.lock().helpers.contains(name)
    }

    /// Check if a template is in the compile cache
    pub fn is_cached(&self, key: &str) -> bool {
        self.lock().cache.contains(key)
    }

    /// Keys in the compile cache
    pub fn cached_templates(&self) -> Vec<String> {
        self.lock().cache.keys()
    }

    /// Drop one compiled template
    pub fn invalidate(&self, key: &str) -> bool {
        let mut state = self.lock();
        if !state.partials.contains(key) {
            state.registry.unregister_template(key);
        }
        state.cache.invalidate(key)
    }

    /// Drop all compiled templates
    pub fn clear_cache(&self) {
        let mut state = self.lock();
        for key in state.cache.keys() {
            if !state.partials.contains(&key) {
                state.registry.unregister_template(&key);
            }
        }
        state.cache.clear();
    }

    /// Get configuration
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

fn apply_compile_options(registry: &mut Handlebars<'static>, options: CompileOptions) {
    registry.set_strict_mode(options.strict);
    if options.no_escape {
        registry.register_escape_fn(handlebars::no_escape);
    } else {
        registry.unregister_escape_fn();
    }
}

/// Merge extra data into an object context. Context fields win.
fn merge_data(context: Value, data: &serde_json::Map<String, Value>) -> Value {
    match context {
        Value::Object(mut map) if !data.is_empty() => {
            for (key, value) in data {
                map.entry(key.clone()).or_insert_with(|| value.clone());
            }
            Value::Object(map)
        }
        Value::Null if !data.is_empty() => Value::Object(data.clone()),
        other => other,
    }
}
