//! Partial loading
//!
//! Every file in the partials directory with the template extension is
//! registered under its base name, in lexicographic path order. Partials are
//! re-read on every call so edits show up on the next render, and a partial
//! whose file is gone is dropped from the registry.

use crate::{cache::CompileCache, resolver, source::TemplateSource, Result, TemplateError};
use handlebars::{Handlebars, Template};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Register every partial found in `dir`, returning the registered names.
///
/// All files are read and compiled before the first one is registered, so a
/// failure leaves the registry as it was.
pub fn load_partials(
    registry: &mut Handlebars<'static>,
    source: &dyn TemplateSource,
    dir: &Path,
    extension: &str,
) -> Result<Vec<String>> {
    let mut files = source
        .list_files(dir, extension)
        .map_err(|source| TemplateError::PartialLoad {
            path: dir.to_path_buf(),
            source,
        })?;
    files.sort();

    let mut compiled = Vec::with_capacity(files.len());
    for file in files {
        // listed paths already include `dir`, resolve the bare file name
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let resolved = resolver::resolve(&file_name, dir, extension);

        let content =
            source
                .read_to_string(&resolved.path)
                .map_err(|source| TemplateError::PartialLoad {
                    path: resolved.path.clone(),
                    source,
                })?;

        let template = Template::compile(&content).map_err(|source| TemplateError::Compile {
            key: resolved.name.clone(),
            path: resolved.path.clone(),
            source,
        })?;

        compiled.push((resolved, template));
    }

    let mut names = Vec::with_capacity(compiled.len());
    for (resolved, template) in compiled {
        registry.register_template(&resolved.name, template);
        debug!(partial = %resolved.name, path = %resolved.path.display(), "Registered partial");
        names.push(resolved.name);
    }

    Ok(names)
}

/// Partials registered from a directory by the most recent load
#[derive(Debug, Default)]
pub struct LoadedPartials {
    names: BTreeSet<String>,
}

impl LoadedPartials {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `name` currently comes from the partials directory
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Loaded partial names, sorted
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// Load the partials in `dir` and drop the ones an earlier load
    /// registered that are no longer there.
    pub fn reload(
        &mut self,
        registry: &mut Handlebars<'static>,
        cache: &CompileCache,
        source: &dyn TemplateSource,
        dir: &Path,
        extension: &str,
    ) -> Result<()> {
        let loaded: BTreeSet<String> = load_partials(registry, source, dir, extension)?
            .into_iter()
            .collect();

        for name in self.names.difference(&loaded) {
            release(registry, cache, name);
        }
        self.names = loaded;
        Ok(())
    }

    /// Drop every partial from the last load
    pub fn clear(&mut self, registry: &mut Handlebars<'static>, cache: &CompileCache) {
        for name in std::mem::take(&mut self.names) {
            release(registry, cache, &name);
        }
    }
}

/// Give a name back to the compiled template it shadowed, or free it
fn release(registry: &mut Handlebars<'static>, cache: &CompileCache, name: &str) {
    match cache.get(name) {
        Some(compiled) => registry.register_template(name, compiled.template.clone()),
        None => registry.unregister_template(name),
    }
    debug!(partial = name, "Dropped partial");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompileOptions;
    use crate::source::FsTemplateSource;
    use serde_json::json;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_partials() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("header.hbs"), "<h1>{{title}}</h1>").unwrap();
        fs::write(temp_dir.path().join("footer.hbs"), "© Co").unwrap();
        fs::write(temp_dir.path().join("readme.md"), "not a partial").unwrap();
        temp_dir
    }

    #[test]
    fn test_registers_sorted_names() {
        let temp_dir = create_partials();
        let mut registry = Handlebars::new();

        let names = load_partials(&mut registry, &FsTemplateSource, temp_dir.path(), ".hbs").unwrap();

        assert_eq!(names, vec!["footer".to_string(), "header".to_string()]);
        assert!(registry.has_template("footer"));
        assert!(!registry.has_template("readme"));
    }

    #[test]
    fn test_registered_partial_renders() {
        let temp_dir = create_partials();
        let mut registry = Handlebars::new();
        load_partials(&mut registry, &FsTemplateSource, temp_dir.path(), ".hbs").unwrap();

        let html = registry
            .render_template("{{> header}}<p>body</p>{{> footer}}", &json!({"title": "Hi"}))
            .unwrap();

        assert_eq!(html, "<h1>Hi</h1><p>body</p>© Co");
    }

    #[test]
    fn test_missing_dir_is_partial_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = Handlebars::new();

        let result = load_partials(
            &mut registry,
            &FsTemplateSource,
            &temp_dir.path().join("absent"),
            ".hbs",
        );

        assert!(matches!(result, Err(TemplateError::PartialLoad { .. })));
    }

    #[test]
    fn test_malformed_partial_is_compile_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.hbs"), "{{#each items}}x{{/if}}").unwrap();
        fs::write(temp_dir.path().join("a_good.hbs"), "ok").unwrap();
        let mut registry = Handlebars::new();

        let result = load_partials(&mut registry, &FsTemplateSource, temp_dir.path(), ".hbs");

        assert!(matches!(result, Err(TemplateError::Compile { ref key, .. }) if key == "bad"));
        // nothing registered when one file fails
        assert!(!registry.has_template("a_good"));
    }

    /// Lists two partials but cannot read `broken.hbs`
    struct UnreadableSource;

    impl TemplateSource for UnreadableSource {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            if path.ends_with("broken.hbs") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                Ok("fine".to_string())
            }
        }

        fn list_files(&self, dir: &Path, _extension: &str) -> io::Result<Vec<PathBuf>> {
            Ok(vec![dir.join("broken.hbs"), dir.join("alpha.hbs")])
        }
    }

    #[test]
    fn test_unreadable_partial_is_partial_load_error() {
        let mut registry = Handlebars::new();

        let result = load_partials(&mut registry, &UnreadableSource, Path::new("/partials"), ".hbs");

        match result {
            Err(TemplateError::PartialLoad { path, source }) => {
                assert_eq!(path, PathBuf::from("/partials/broken.hbs"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected PartialLoad, got {:?}", other),
        }
        assert!(!registry.has_template("alpha"));
    }

    #[test]
    fn test_reload_drops_removed_partials() {
        let temp_dir = create_partials();
        let mut registry = Handlebars::new();
        let cache = CompileCache::new();
        let mut loaded = LoadedPartials::new();

        loaded
            .reload(&mut registry, &cache, &FsTemplateSource, temp_dir.path(), ".hbs")
            .unwrap();
        assert_eq!(loaded.names(), vec!["footer".to_string(), "header".to_string()]);

        fs::remove_file(temp_dir.path().join("footer.hbs")).unwrap();
        loaded
            .reload(&mut registry, &cache, &FsTemplateSource, temp_dir.path(), ".hbs")
            .unwrap();

        assert!(!loaded.contains("footer"));
        assert!(!registry.has_template("footer"));
        assert!(registry.has_template("header"));

        loaded.clear(&mut registry, &cache);
        assert!(loaded.names().is_empty());
        assert!(!registry.has_template("header"));
    }

    #[test]
    fn test_released_name_goes_back_to_compiled_template() {
        let templates = TempDir::new().unwrap();
        let footer = templates.path().join("footer.hbs");
        fs::write(&footer, "compiled footer").unwrap();
        let partials = create_partials();

        let mut registry = Handlebars::new();
        let mut cache = CompileCache::new();
        let compiled = cache
            .get_or_compile("footer", &footer, CompileOptions::default(), &FsTemplateSource)
            .unwrap();
        registry.register_template("footer", compiled.template.clone());

        let mut loaded = LoadedPartials::new();
        loaded
            .reload(&mut registry, &cache, &FsTemplateSource, partials.path(), ".hbs")
            .unwrap();
        assert_eq!(registry.render("footer", &json!({})).unwrap(), "© Co");

        loaded.clear(&mut registry, &cache);
        assert_eq!(registry.render("footer", &json!({})).unwrap(), "compiled footer");
    }
}
