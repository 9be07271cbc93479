use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a type variable with no evidence at all is bound.
///
/// This applies to the generics of the root class when no explicit bindings are given, and to the
/// generics of a supertype that is extended/implemented raw (`extends Base` for a generic `Base`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedGenerics {
    /// Bind to the erasure of the variable's first declared bound (`Object` when unbounded).
    #[default]
    UpperBound,
    /// Leave the variable unresolved; substitution keeps it as a variable reference.
    Variable,
}

/// Resolver settings, usually embedded in a larger TOML document.
///
/// ```toml
/// unresolved_generics = "variable"
/// ignore_classes = ["groovy.lang.GroovyObject"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default)]
    pub unresolved_generics: UnresolvedGenerics,

    /// Binary names of classes where hierarchy walking stops. Unknown names are ignored.
    #[serde(default)]
    pub ignore_classes: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid resolver config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ResolverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            target: "nova.generics",
            path = %path.display(),
            unresolved_generics = ?config.unresolved_generics,
            ignored = config.ignore_classes.len(),
            "loaded resolver config"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ResolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.unresolved_generics, UnresolvedGenerics::UpperBound);
    }

    #[test]
    fn parses_all_keys() {
        let config = ResolverConfig::from_toml_str(
            r#"
                unresolved_generics = "variable"
                ignore_classes = ["groovy.lang.GroovyObject", "com.example.Marker"]
            "#,
        )
        .unwrap();
        assert_eq!(config.unresolved_generics, UnresolvedGenerics::Variable);
        assert_eq!(
            config.ignore_classes,
            vec!["groovy.lang.GroovyObject", "com.example.Marker"]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ResolverConfig::from_toml_str("ignore = []").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generics.toml");
        std::fs::write(&path, "unresolved_generics = \"upper_bound\"\n").unwrap();

        let config = ResolverConfig::load_from_path(&path).unwrap();
        assert_eq!(config.unresolved_generics, UnresolvedGenerics::UpperBound);

        let missing = ResolverConfig::load_from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
