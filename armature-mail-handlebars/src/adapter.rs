//! Mail template adapter
//!
//! Renders the template a [`TemplateMail`] names and writes the HTML body
//! back into it:
//!
//! 1. resolve the template reference and compile it (cached),
//! 2. register partials when a partials directory is configured,
//! 3. render with the mail context,
//! 4. inline CSS when enabled.
//!
//! Steps 1-3 run on a blocking thread. Inlining is the only await point. Any
//! failure ends the call with an error and leaves `mail.html` untouched.

use crate::{
    config::{AdapterConfig, CompileOptions, MailerOptions},
    engine::HandlebarsEngine,
    inliner::{CssInline, CssInliner},
    mail::TemplateMail,
    source::{FsTemplateSource, TemplateSource},
    RenderStage, Result, TemplateError,
};
use async_trait::async_trait;
use handlebars::HelperDef;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Produces the HTML body of a mail from its template
#[async_trait]
pub trait TemplateAdapter: Send + Sync {
    /// Render `mail.template` into `mail.html`
    async fn compile(&self, mail: &mut TemplateMail, options: &MailerOptions) -> Result<()>;
}

/// Handlebars-based [`TemplateAdapter`] with CSS inlining
#[derive(Clone)]
pub struct HandlebarsAdapter {
    engine: HandlebarsEngine,
    inliner: Option<Arc<dyn CssInliner>>,
}

impl HandlebarsAdapter {
    /// Create an adapter reading templates from the local filesystem
    pub fn new(config: AdapterConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start building an adapter
    pub fn builder(config: AdapterConfig) -> HandlebarsAdapterBuilder {
        HandlebarsAdapterBuilder::new(config)
    }

    /// Render `reference` and return the final HTML
    pub async fn render(&self, reference: &str, context: Value, options: &MailerOptions) -> Result<String> {
        let engine = self.engine.clone();
        let reference = reference.to_string();
        let blocking_options = options.clone();

        let rendered = tokio::task::spawn_blocking(move || {
            engine.render(&reference, context, &blocking_options)
        })
        .await
        .map_err(|e| TemplateError::Task(e.to_string()))??;

        match &self.inliner {
            Some(inliner) => {
                trace!(stage = %RenderStage::Inlining, "Inlining CSS");
                inliner.inline(rendered).await
            }
            None => Ok(rendered),
        }
    }

    /// Compile a template without rendering it
    pub fn precompile(&self, reference: &str, base_dir: &Path, options: CompileOptions) -> Result<()> {
        self.engine.compile(reference, base_dir, options).map(|_| ())
    }

    /// Register a helper on this adapter's engine
    pub fn register_helper<H>(&self, name: &str, helper: H)
    where
        H: HelperDef + Send + Sync + 'static,
    {
        self.engine.register_helper(name, helper);
    }

    /// Register a partial on this adapter's engine
    pub fn register_partial(&self, name: &str, template: &str) -> Result<()> {
        self.engine.register_partial(name, template)
    }

    /// Check if a template key is in the compile cache
    pub fn is_cached(&self, key: &str) -> bool {
        self.engine.is_cached(key)
    }

    /// Keys in the compile cache
    pub fn cached_templates(&self) -> Vec<String> {
        self.engine.cached_templates()
    }

    /// Drop one compiled template so its file is read again on next use
    pub fn invalidate(&self, key: &str) -> bool {
        self.engine.invalidate(key)
    }

    /// Drop all compiled templates
    pub fn clear_cache(&self) {
        self.engine.clear_cache();
    }

    /// Check if CSS inlining is enabled
    pub fn inlining_enabled(&self) -> bool {
        self.inliner.is_some()
    }

    /// Get configuration
    pub fn config(&self) -> &AdapterConfig {
        self.engine.config()
    }
}

#[async_trait]
impl TemplateAdapter for HandlebarsAdapter {
    async fn compile(&self, mail: &mut TemplateMail, options: &MailerOptions) -> Result<()> {
        match self.render(&mail.template, mail.context.clone(), options).await {
            Ok(html) => {
                mail.html = Some(html);
                debug!(template = %mail.template, stage = %RenderStage::Done, "Mail body rendered");
                Ok(())
            }
            Err(err) => {
                warn!(template = %mail.template, stage = %err.stage(), error = %err, "Mail body render failed");
                Err(err)
            }
        }
    }
}

type HelperRegistration = Box<dyn FnOnce(&HandlebarsEngine) + Send>;

/// Builder for [`HandlebarsAdapter`]
pub struct HandlebarsAdapterBuilder {
    config: AdapterConfig,
    source: Arc<dyn TemplateSource>,
    inliner: Option<Arc<dyn CssInliner>>,
    helpers: Vec<HelperRegistration>,
}

impl HandlebarsAdapterBuilder {
    fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            source: Arc::new(FsTemplateSource),
            inliner: None,
            helpers: Vec::new(),
        }
    }

    /// Read templates through a custom source
    pub fn source(mut self, source: Arc<dyn TemplateSource>) -> Self {
        self.source = source;
        self
    }

    /// Use a custom CSS inliner instead of [`CssInline`]
    pub fn inliner(mut self, inliner: Arc<dyn CssInliner>) -> Self {
        self.inliner = Some(inliner);
        self
    }

    /// Register a helper at construction. Overrides a built-in of the same name.
    pub fn helper<H>(mut self, name: impl Into<String>, helper: H) -> Self
    where
        H: HelperDef + Send + Sync + 'static,
    {
        let name = name.into();
        self.helpers
            .push(Box::new(move |engine: &HandlebarsEngine| {
                engine.register_helper(&name, helper)
            }));
        self
    }

    /// Build the adapter
    pub fn build(self) -> Result<HandlebarsAdapter> {
        let inliner = if self.config.css_inlining.enabled {
            match self.inliner {
                Some(inliner) => Some(inliner),
                None => Some(
                    Arc::new(CssInline::new(self.config.css_inlining.options.clone())?)
                        as Arc<dyn CssInliner>,
                ),
            }
        } else {
            None
        };

        let engine = HandlebarsEngine::new(self.config, self.source);
        for register in self.helpers {
            register(&engine);
        }

        Ok(HandlebarsAdapter { engine, inliner })
    }
}
