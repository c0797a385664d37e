//! Source Program Builder.
//!
//! Loads an entry file and every file it transitively imports into a
//! [`CompiledUnit`], so types declared in other modules can be resolved.
//! Results are cached per canonical entry path and [`BuildOptions`] in a
//! [`ProgramCache`].
//!
//! # Example
//!
//! ```rust
//! use mcpkit_compiler::program::ProgramBuilder;
//!
//! let builder = ProgramBuilder::new();
//! let unit = builder
//!     .build_source("/virtual/server.ts", "interface PingTool { name: 'ping' }")
//!     .unwrap();
//! assert_eq!(unit.entry().interfaces[0].name, "PingTool");
//! ```

pub mod ast;
mod cache;
pub(crate) mod syntax;

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use mcpkit_core::error::{CompileError, CompileResultExt};

pub use cache::ProgramCache;

use crate::config::ProjectConfig;
use ast::Module;

const TS_EXTENSIONS: [&str; 4] = ["ts", "tsx", "mts", "cts"];
const PROBE_SUFFIXES: [&str; 4] = [".ts", ".tsx", ".d.ts", ".mts"];
const INDEX_FILES: [&str; 3] = ["index.ts", "index.tsx", "index.d.ts"];

/// One loaded program: the entry module plus everything it imports.
#[derive(Debug)]
pub struct CompiledUnit {
    entry: Arc<Module>,
    modules: IndexMap<PathBuf, Arc<Module>>,
    config: ProjectConfig,
}

impl CompiledUnit {
    /// The entry file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.entry.path
    }

    /// The entry module.
    #[must_use]
    pub fn entry(&self) -> &Module {
        &self.entry
    }

    /// A loaded module by path.
    #[must_use]
    pub fn module(&self, path: &Path) -> Option<&Module> {
        self.modules.get(path).map(AsRef::as_ref)
    }

    /// Every loaded module, entry first, then in discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values().map(AsRef::as_ref)
    }

    /// Number of loaded modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no module is loaded. Never true for a built unit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The project configuration used to resolve imports.
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }
}

/// Options for locating project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BuildOptions {
    /// Directory to start configuration discovery from, instead of the
    /// entry file's directory.
    pub project_root: Option<PathBuf>,
    /// Use this configuration file and skip discovery.
    pub tsconfig: Option<PathBuf>,
}

/// Builds [`CompiledUnit`]s, caching them by entry path.
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    cache: Arc<ProgramCache>,
    options: BuildOptions,
}

impl ProgramBuilder {
    /// Create a builder with its own cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a shared cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ProgramCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set configuration discovery options.
    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// The cache this builder populates.
    #[must_use]
    pub fn cache(&self) -> &Arc<ProgramCache> {
        &self.cache
    }

    /// Evict one cached program, or all of them.
    pub fn clear_cache(&self, path: Option<&Path>) -> usize {
        self.cache.clear(path)
    }

    /// Build (or fetch from cache) the program rooted at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the entry or an imported file is missing or unparsable, a
    /// relative import cannot be resolved, or the project configuration is
    /// invalid.
    pub fn build(&self, path: impl AsRef<Path>) -> Result<Arc<CompiledUnit>, CompileError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CompileError::source_not_found(path));
        }
        let entry = fs::canonicalize(path).map_err(|err| CompileError::io(path, err))?;

        if let Some(unit) = self.cache.get(&entry, &self.options) {
            tracing::trace!(path = %entry.display(), "program cache hit");
            return Ok(unit);
        }

        let config = self.project_config(&entry)?;
        let unit = Arc::new(self.load(entry, None, config)?);
        Ok(self.cache.insert(unit, &self.options))
    }

    /// Build a program from in-memory entry source. Imports are still read
    /// from disk relative to `path`. The result is not cached.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build), except that the entry need not exist.
    pub fn build_source(
        &self,
        path: impl Into<PathBuf>,
        source: &str,
    ) -> Result<CompiledUnit, CompileError> {
        let entry = path.into();
        let config = self.project_config(&entry)?;
        self.load(entry, Some(source), config)
    }

    fn project_config(&self, entry: &Path) -> Result<ProjectConfig, CompileError> {
        if let Some(tsconfig) = &self.options.tsconfig {
            return ProjectConfig::load(tsconfig);
        }
        let start = self
            .options
            .project_root
            .clone()
            .or_else(|| entry.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        ProjectConfig::discover(&start)
    }

    fn load(
        &self,
        entry: PathBuf,
        entry_source: Option<&str>,
        config: ProjectConfig,
    ) -> Result<CompiledUnit, CompileError> {
        let mut modules: IndexMap<PathBuf, Arc<Module>> = IndexMap::new();
        let mut queue: VecDeque<(PathBuf, Option<PathBuf>)> = VecDeque::from([(entry.clone(), None)]);

        while let Some((path, importer)) = queue.pop_front() {
            if modules.contains_key(&path) {
                continue;
            }

            let module = match entry_source {
                Some(source) if path == entry => load_module(&path, source, &config),
                _ => fs::read_to_string(&path)
                    .map_err(|err| CompileError::io(&path, err))
                    .and_then(|text| load_module(&path, &text, &config)),
            };
            let module = match &importer {
                Some(importer) => module.with_context(|| {
                    format!("while loading a module imported by {}", importer.display())
                })?,
                None => module?,
            };

            for dep in module.dependencies() {
                if !modules.contains_key(dep) {
                    queue.push_back((dep.clone(), Some(path.clone())));
                }
            }

            tracing::debug!(
                path = %path.display(),
                interfaces = module.interfaces.len(),
                aliases = module.aliases.len(),
                classes = module.classes.len(),
                "loaded module"
            );
            modules.insert(path, Arc::new(module));
        }

        let entry_module = modules
            .get(&entry)
            .cloned()
            .ok_or_else(|| CompileError::source_not_found(&entry))?;

        Ok(CompiledUnit {
            entry: entry_module,
            modules,
            config,
        })
    }
}

fn load_module(path: &Path, source: &str, config: &ProjectConfig) -> Result<Module, CompileError> {
    let mut module = syntax::parse_module(path, source)?;
    resolve_specifiers(&mut module, config)?;
    Ok(module)
}

fn resolve_specifiers(module: &mut Module, config: &ProjectConfig) -> Result<(), CompileError> {
    let importer = module.path.clone();
    for import in &mut module.imports {
        import.resolved = resolve_specifier(&importer, &import.specifier, config)?;
    }
    for export in &mut module.exports {
        if let Some(specifier) = export.specifier().map(str::to_owned) {
            export.set_resolved(resolve_specifier(&importer, &specifier, config)?);
        }
    }
    Ok(())
}

/// Resolve an import specifier to a loadable file.
///
/// `Ok(None)` means the import is external: a package, or a relative file
/// that is not TypeScript source.
fn resolve_specifier(
    importer: &Path,
    specifier: &str,
    config: &ProjectConfig,
) -> Result<Option<PathBuf>, CompileError> {
    let is_relative = specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier == "."
        || specifier == ".."
        || specifier.starts_with('/');

    if is_relative {
        let base = importer
            .parent()
            .map_or_else(|| PathBuf::from(specifier), |dir| dir.join(specifier));
        if let Some(found) = probe(&base) {
            return Ok(Some(found));
        }
        if base.is_file() {
            return Ok(None);
        }
        return Err(CompileError::unresolved_import(importer, specifier));
    }

    Ok(config
        .alias_candidates(specifier)
        .iter()
        .find_map(|candidate| probe(candidate)))
}

/// Find the TypeScript file a path refers to, trying extensions and index
/// files.
fn probe(base: &Path) -> Option<PathBuf> {
    let found = probe_uncanonical(base)?;
    Some(fs::canonicalize(&found).unwrap_or(found))
}

fn probe_uncanonical(base: &Path) -> Option<PathBuf> {
    let extension = base.extension().and_then(|ext| ext.to_str());

    // ESM-style imports name the emitted file.
    let swapped = match extension {
        Some("js") => Some(["ts", "tsx"].as_slice()),
        Some("jsx") => Some(["tsx"].as_slice()),
        Some("mjs") => Some(["mts"].as_slice()),
        Some("cjs") => Some(["cts"].as_slice()),
        _ => None,
    };
    if let Some(candidates) = swapped {
        if let Some(found) = candidates
            .iter()
            .map(|ext| base.with_extension(ext))
            .find(|path| path.is_file())
        {
            return Some(found);
        }
    }

    if extension.is_some_and(|ext| TS_EXTENSIONS.contains(&ext)) && base.is_file() {
        return Some(base.to_path_buf());
    }

    let with_suffix = |suffix: &str| {
        let mut name = base.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    };
    if let Some(found) = PROBE_SUFFIXES
        .iter()
        .map(|suffix| with_suffix(suffix))
        .find(|path| path.is_file())
    {
        return Some(found);
    }

    if base.is_dir() {
        return INDEX_FILES
            .iter()
            .map(|index| base.join(index))
            .find(|path| path.is_file());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, text).expect("write");
        path
    }

    #[test]
    fn test_missing_entry() {
        let err = ProgramBuilder::new()
            .build("/definitely/not/here.ts")
            .unwrap_err();
        assert!(matches!(err, CompileError::SourceNotFound { .. }));
    }

    #[test]
    fn test_loads_transitive_imports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write(
            dir.path(),
            "server.ts",
            "import { WeatherTool } from './tools.js';\nexport default class S {}\n",
        );
        write(
            dir.path(),
            "tools.ts",
            "export * from './shapes';\nexport interface WeatherTool { name: 'w' }\n",
        );
        write(dir.path(), "shapes/index.ts", "export interface Base { a: string }\n");

        let unit = ProgramBuilder::new().build(&entry).expect("build");
        assert_eq!(unit.len(), 3);
        assert_eq!(unit.entry().classes.len(), 1);
        assert!(unit.entry().imports[0].resolved.is_some());
    }

    #[test]
    fn test_unresolved_relative_import() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write(dir.path(), "server.ts", "import { X } from './missing';\n");

        let err = ProgramBuilder::new().build(&entry).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedImport { ref specifier, .. } if specifier == "./missing"));
    }

    #[test]
    fn test_packages_are_external() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write(
            dir.path(),
            "server.ts",
            "import type { ITool } from 'simply-mcp';\nimport data from './data.json';\n",
        );
        write(dir.path(), "data.json", "{}");

        let unit = ProgramBuilder::new().build(&entry).expect("build");
        assert_eq!(unit.len(), 1);
        assert!(unit.entry().imports.iter().all(|i| i.resolved.is_none()));
    }

    #[test]
    fn test_paths_alias() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            dir.path(),
            "tsconfig.json",
            r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@shapes/*": ["src/shapes/*"] } } }"#,
        );
        let entry = write(
            dir.path(),
            "src/server.ts",
            "import { Ping } from '@shapes/ping';\n",
        );
        write(dir.path(), "src/shapes/ping.ts", "export interface Ping { name: 'ping' }\n");

        let unit = ProgramBuilder::new().build(&entry).expect("build");
        assert_eq!(unit.len(), 2);
        assert!(unit.config().path.is_some());
    }

    #[test]
    fn test_cache_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write(dir.path(), "server.ts", "interface A { name: 'a' }\n");
        let builder = ProgramBuilder::new();

        let first = builder.build(&entry).expect("build");
        let second = builder.build(&entry).expect("build");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.cache().len(), 1);

        fs::write(&entry, "interface B { name: 'b' }\n").expect("rewrite");
        assert_eq!(builder.build(&entry).expect("build").entry().interfaces[0].name, "A");

        assert_eq!(builder.clear_cache(Some(&entry)), 1);
        assert_eq!(builder.build(&entry).expect("build").entry().interfaces[0].name, "B");

        assert_eq!(builder.clear_cache(None), 1);
        assert!(builder.cache().is_empty());
    }

    #[test]
    fn test_shared_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write(dir.path(), "server.ts", "interface A { name: 'a' }\n");
        let cache = ProgramCache::shared();

        ProgramBuilder::new()
            .with_cache(Arc::clone(&cache))
            .build(&entry)
            .expect("build");
        assert!(cache.contains(&fs::canonicalize(&entry).expect("canonical")));
    }

    #[test]
    fn test_shared_cache_separates_build_options() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write(dir.path(), "server.ts", "import { Ping } from 'lib/ping';\n");
        write(dir.path(), "lib/ping.ts", "export interface Ping { name: 'ping' }\n");
        let tsconfig = write(
            dir.path(),
            "configs/tsconfig.json",
            r#"{ "compilerOptions": { "baseUrl": ".." } }"#,
        );
        let cache = ProgramCache::shared();

        let discovered = ProgramBuilder::new()
            .with_cache(Arc::clone(&cache))
            .build(&entry)
            .expect("build");
        let configured = ProgramBuilder::new()
            .with_cache(Arc::clone(&cache))
            .with_options(BuildOptions {
                tsconfig: Some(tsconfig),
                ..BuildOptions::default()
            })
            .build(&entry)
            .expect("build");

        assert_eq!(discovered.len(), 1);
        assert_eq!(configured.len(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.clear(Some(&entry)), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_import_errors_name_the_importer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = write(dir.path(), "server.ts", "import { A } from './shapes';\n");
        write(dir.path(), "shapes.ts", "export interface A {{{\n");

        let err = ProgramBuilder::new().build(&entry).unwrap_err();
        assert!(matches!(err, CompileError::WithContext { .. }));
        assert!(err.to_string().contains("imported by"), "{err}");
        match err.root() {
            CompileError::Syntax { path, .. } => {
                assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("shapes.ts"));
            }
            other => panic!("expected a syntax error, got {other}"),
        }
    }

    #[test]
    fn test_syntax_error_fails_build() {
        let err = ProgramBuilder::new()
            .build_source("/virtual/bad.ts", "interface { }}}")
            .unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
    }
}
