//! Project configuration discovery.
//!
//! The nearest `tsconfig.json` above the entry file supplies module
//! resolution settings (`baseUrl`, `paths`). A project without one compiles
//! under a permissive default configuration.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use mcpkit_core::error::{CompileError, CompileResultExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name searched for during discovery.
pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Maximum depth of an `extends` chain.
const MAX_EXTENDS_DEPTH: usize = 8;

/// The parts of a `tsconfig.json` the compiler reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TsConfig {
    /// Relative path of a base configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Compiler options.
    pub compiler_options: CompilerOptions,
}

/// `compilerOptions`. Options the compiler does not interpret are kept in
/// [`other`](Self::other).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Base directory for bare specifiers, relative to the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Path aliases: pattern (at most one `*`) to substitution list.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, Vec<String>>,
    /// `strict`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// `target`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// `module`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// `moduleResolution`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_resolution: Option<String>,
    /// `jsx`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsx: Option<String>,
    /// `allowJs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_js: Option<bool>,
    /// `skipLibCheck`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_lib_check: Option<bool>,
    /// `experimentalDecorators`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental_decorators: Option<bool>,
    /// Everything else, preserved verbatim.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl CompilerOptions {
    /// Defaults able to parse any reasonable server definition.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            strict: Some(false),
            target: Some("ES2022".to_string()),
            module: Some("ESNext".to_string()),
            module_resolution: Some("bundler".to_string()),
            jsx: Some("preserve".to_string()),
            allow_js: Some(true),
            skip_lib_check: Some(true),
            experimental_decorators: Some(true),
            ..Self::default()
        }
    }

    /// Layer `self` over `base`. Settings present in `self` win.
    #[must_use]
    pub fn merged_over(self, base: Self) -> Self {
        let mut other = base.other;
        other.extend(self.other);
        Self {
            base_url: self.base_url.or(base.base_url),
            paths: if self.paths.is_empty() {
                base.paths
            } else {
                self.paths
            },
            strict: self.strict.or(base.strict),
            target: self.target.or(base.target),
            module: self.module.or(base.module),
            module_resolution: self.module_resolution.or(base.module_resolution),
            jsx: self.jsx.or(base.jsx),
            allow_js: self.allow_js.or(base.allow_js),
            skip_lib_check: self.skip_lib_check.or(base.skip_lib_check),
            experimental_decorators: self.experimental_decorators.or(base.experimental_decorators),
            other,
        }
    }
}

/// The resolved configuration for one compile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    /// The configuration file, if one was found.
    pub path: Option<PathBuf>,
    /// Directory relative settings are resolved against.
    pub root: PathBuf,
    /// Effective options (user settings over permissive defaults).
    pub options: CompilerOptions,
}

impl ProjectConfig {
    /// Permissive defaults rooted at `root`.
    #[must_use]
    pub fn permissive(root: impl Into<PathBuf>) -> Self {
        Self {
            path: None,
            root: root.into(),
            options: CompilerOptions::permissive(),
        }
    }

    /// Search `start` and its ancestors for a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be read
    /// or parsed.
    pub fn discover(start: &Path) -> Result<Self, CompileError> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        tracing::debug!(start = %start.display(), "no project configuration found, using defaults");
        Ok(Self::permissive(start))
    }

    /// Load a specific configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON
    /// (comments and trailing commas are accepted).
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let user = read_chain(path, 0)?;
        let root = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        tracing::debug!(path = %path.display(), "loaded project configuration");
        Ok(Self {
            path: Some(path.to_path_buf()),
            root,
            options: user.merged_over(CompilerOptions::permissive()),
        })
    }

    /// Directory bare specifiers are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.options.base_url.as_ref().map(|base| self.root.join(base))
    }

    /// Candidate paths for a bare specifier, in priority order, before
    /// extension probing.
    #[must_use]
    pub fn alias_candidates(&self, specifier: &str) -> Vec<PathBuf> {
        let base = self.base_dir().unwrap_or_else(|| self.root.clone());
        let mut out = Vec::new();

        for (pattern, targets) in &self.options.paths {
            let Some(captured) = match_pattern(pattern, specifier) else {
                continue;
            };
            out.extend(
                targets
                    .iter()
                    .map(|target| base.join(target.replacen('*', captured, 1))),
            );
        }

        if let Some(base_dir) = self.base_dir() {
            out.push(base_dir.join(specifier));
        }
        out
    }
}

fn match_pattern<'a>(pattern: &str, specifier: &'a str) -> Option<&'a str> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some(""),
        Some((prefix, suffix)) => specifier
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix)),
    }
}

fn read_chain(path: &Path, depth: usize) -> Result<CompilerOptions, CompileError> {
    let text = fs::read_to_string(path).map_err(|err| CompileError::io(path, err))?;
    let config: TsConfig =
        serde_json::from_str(&strip_jsonc(&text)).map_err(|source| CompileError::ProjectConfig {
            path: path.to_path_buf(),
            source,
        })?;

    let Some(extends) = config.extends.as_deref() else {
        return Ok(config.compiler_options);
    };
    if !extends.starts_with('.') || depth >= MAX_EXTENDS_DEPTH {
        tracing::debug!(extends, "ignoring non-relative or deep tsconfig extends");
        return Ok(config.compiler_options);
    }

    let mut base_path = path
        .parent()
        .map_or_else(|| PathBuf::from(extends), |dir| dir.join(extends));
    if base_path.extension().is_none() {
        base_path.set_extension("json");
    }
    let base = read_chain(&base_path, depth + 1)
        .with_context(|| format!("while reading base configuration of {}", path.display()))?;
    Ok(config.compiler_options.merged_over(base))
}

/// Remove comments and trailing commas from JSON-with-comments text.
#[must_use]
pub fn strip_jsonc(text: &str) -> String {
    let mut without_comments = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            without_comments.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        without_comments.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                without_comments.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        without_comments.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => without_comments.push(c),
        }
    }

    let chars: Vec<char> = without_comments.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.get(i + 1) {
                    out.push(*escaped);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}' | ']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_jsonc() {
        let text = r#"{
            // line comment
            "compilerOptions": {
                /* block */ "baseUrl": "./src", // trailing
                "paths": { "@lib/*": ["lib/*",], },
                "url": "http://example.com/*not a comment*/",
            },
        }"#;
        let config: TsConfig = serde_json::from_str(&strip_jsonc(text)).expect("valid jsonc");
        assert_eq!(config.compiler_options.base_url.as_deref(), Some("./src"));
        assert_eq!(
            config.compiler_options.other.get("url"),
            Some(&Value::String("http://example.com/*not a comment*/".into()))
        );
    }

    #[test]
    fn test_user_options_win() {
        let user = CompilerOptions {
            strict: Some(true),
            target: Some("ES2020".into()),
            ..CompilerOptions::default()
        };
        let merged = user.merged_over(CompilerOptions::permissive());
        assert_eq!(merged.strict, Some(true));
        assert_eq!(merged.target.as_deref(), Some("ES2020"));
        assert_eq!(merged.allow_js, Some(true));
    }

    #[test]
    fn test_alias_candidates() {
        let mut config = ProjectConfig::permissive("/project");
        config.options.base_url = Some("src".into());
        config
            .options
            .paths
            .insert("@shapes/*".into(), vec!["shapes/*".into()]);

        assert_eq!(
            config.alias_candidates("@shapes/tools"),
            vec![
                PathBuf::from("/project/src/shapes/tools"),
                PathBuf::from("/project/src/@shapes/tools"),
            ]
        );
        assert_eq!(
            config.alias_candidates("lodash"),
            vec![PathBuf::from("/project/src/lodash")]
        );
    }

    #[test]
    fn test_match_pattern() {
        assert_eq!(match_pattern("@a/*", "@a/b/c"), Some("b/c"));
        assert_eq!(match_pattern("exact", "exact"), Some(""));
        assert_eq!(match_pattern("@a/*.js", "@a/x.ts"), None);
    }

    #[test]
    fn test_discover_and_extends() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("base.json"),
            r#"{ "compilerOptions": { "baseUrl": ".", "strict": true } }"#,
        )
        .expect("write base");
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "extends": "./base", "compilerOptions": { "strict": false } }"#,
        )
        .expect("write config");
        let nested = dir.path().join("src/tools");
        fs::create_dir_all(&nested).expect("mkdir");

        let config = ProjectConfig::discover(&nested).expect("config");
        assert_eq!(config.path, Some(dir.path().join(CONFIG_FILE_NAME)));
        assert_eq!(config.options.base_url.as_deref(), Some("."));
        assert_eq!(config.options.strict, Some(false));
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").expect("write");

        let err = ProjectConfig::load(&path).unwrap_err();
        assert!(matches!(err, CompileError::ProjectConfig { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
    }
}
