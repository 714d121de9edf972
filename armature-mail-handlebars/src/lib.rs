//! Handlebars mail templates for Armature
//!
//! Renders the HTML body of outgoing mail from Handlebars templates on disk
//! and inlines the stylesheets so mail clients that drop `<style>` blocks
//! still show the styling.
//!
//! ## Features
//!
//! - 📁 Template references with or without extension, relative or absolute
//! - ⚡ Per-adapter compile cache, each template read and compiled once
//! - 🧩 Partials directory re-read on every render
//! - 🎨 CSS inlining via `css-inline`
//! - 🔧 Built-in helpers (`concat`, `eq`, `upper`, `lower`, `default`) plus custom helpers
//! - ⚙️ Typed configuration, loadable from TOML
//!
//! ## Example
//!
//! ```no_run
//! use armature_mail_handlebars::{
//!     AdapterConfig, HandlebarsAdapter, MailerOptions, TemplateAdapter, TemplateMail,
//! };
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let adapter = HandlebarsAdapter::new(AdapterConfig::default())?;
//!
//! let options = MailerOptions::new("templates/mail")
//!     .with_partials_dir("templates/mail/partials")
//!     .with_data("company", "Acme");
//!
//! let mut mail = TemplateMail::new("welcome").with_context(json!({"name": "Ada"}));
//! adapter.compile(&mut mail, &options).await?;
//!
//! println!("{}", mail.html.unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Cache keys
//!
//! By default templates are cached by file name alone: `emails/welcome.hbs`
//! and `legacy/welcome.hbs` are the same template to the cache, and whichever
//! renders first wins. Use [`CacheKeyStrategy::ResolvedPath`] to key by the
//! full path instead.

pub mod adapter;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod inliner;
pub mod mail;
pub mod partials;
pub mod resolver;
pub mod source;

pub use adapter::{HandlebarsAdapter, HandlebarsAdapterBuilder, TemplateAdapter};
pub use cache::{CompileCache, CompiledTemplate};
pub use config::{
    AdapterConfig, CacheKeyStrategy, CompileOptions, CssInliningConfig, InlineOptions,
    MailerOptions, PartialsOptions, RuntimeOptions, DEFAULT_EXTENSION,
};
pub use engine::HandlebarsEngine;
pub use error::{RenderStage, Result, TemplateError};
pub use inliner::{CssInline, CssInliner};
pub use mail::TemplateMail;
pub use resolver::{resolve, ResolvedTemplate};
pub use source::{FsTemplateSource, TemplateSource};

/// Prelude for common imports.
///
/// ```
/// use armature_mail_handlebars::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adapter::{HandlebarsAdapter, TemplateAdapter};
    pub use crate::config::{AdapterConfig, CompileOptions, MailerOptions};
    pub use crate::error::{Result, TemplateError};
    pub use crate::inliner::CssInliner;
    pub use crate::mail::TemplateMail;
}
