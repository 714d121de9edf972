//! CSS inlining
//!
//! Mail clients strip `<style>` blocks, so rules are moved onto the matching
//! elements as `style` attributes before the HTML is handed to the mailer.

use crate::{config::InlineOptions, Result, TemplateError};
use async_trait::async_trait;
use std::borrow::Cow;
use url::Url;

/// Rewrites stylesheet rules into inline `style` attributes
#[async_trait]
pub trait CssInliner: Send + Sync {
    /// Inline the stylesheets of `html`
    async fn inline(&self, html: String) -> Result<String>;
}

/// [`CssInliner`] backed by the `css-inline` crate
#[derive(Debug, Clone, Default)]
pub struct CssInline {
    options: InlineOptions,
}

impl CssInline {
    /// Create an inliner, validating the options up front
    pub fn new(options: InlineOptions) -> Result<Self> {
        parse_base_url(&options)?;
        Ok(Self { options })
    }

    /// Options this inliner was built with
    pub fn options(&self) -> &InlineOptions {
        &self.options
    }

    /// Inline on the current thread
    pub fn inline_blocking(&self, html: &str) -> Result<String> {
        let inliner = css_inline::CSSInliner::options()
            .keep_style_tags(self.options.keep_style_tags)
            .keep_link_tags(self.options.keep_link_tags)
            .base_url(parse_base_url(&self.options)?)
            .load_remote_stylesheets(self.options.load_remote_stylesheets)
            .extra_css(self.options.extra_css.clone().map(Cow::Owned))
            .build();

        inliner
            .inline(html)
            .map_err(|e| TemplateError::CssInlining(e.to_string()))
    }
}

#[async_trait]
impl CssInliner for CssInline {
    async fn inline(&self, html: String) -> Result<String> {
        let inliner = self.clone();

        tokio::task::spawn_blocking(move || inliner.inline_blocking(&html))
            .await
            .map_err(|e| TemplateError::Task(e.to_string()))?
    }
}

fn parse_base_url(options: &InlineOptions) -> Result<Option<Url>> {
    match options.base_url.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Url::parse(raw)
            .map(Some)
            .map_err(|e| TemplateError::Config(format!("Invalid inliner base_url {:?}: {}", raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLED: &str = "<html><head><style>p { color: red; }</style></head><body><p>Hi</p></body></html>";

    #[test]
    fn test_style_block_moved_inline() {
        let html = CssInline::default().inline_blocking(STYLED).unwrap();

        assert!(html.contains("<p style="));
        assert!(html.contains("color"));
        assert!(!html.contains("<style>"));
    }

    #[test]
    fn test_keep_style_tags() {
        let inliner = CssInline::new(InlineOptions {
            keep_style_tags: true,
            ..InlineOptions::default()
        })
        .unwrap();

        let html = inliner.inline_blocking(STYLED).unwrap();
        assert!(html.contains("<style>"));
        assert!(html.contains("<p style="));
    }

    #[test]
    fn test_blank_base_url_is_none() {
        let options = InlineOptions {
            base_url: Some(" ".to_string()),
            ..InlineOptions::default()
        };
        assert!(CssInline::new(options).is_ok());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let options = InlineOptions {
            base_url: Some("not a url".to_string()),
            ..InlineOptions::default()
        };
        assert!(matches!(CssInline::new(options), Err(TemplateError::Config(_))));
    }

    #[tokio::test]
    async fn test_async_inline() {
        let html = CssInline::default().inline(STYLED.to_string()).await.unwrap();
        assert!(html.contains("<p style="));
    }
}
