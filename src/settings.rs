use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::patterns::Catalog;

pub const SETTINGS_PATH_ENV: &str = "VIBECHECK_SETTINGS";
pub const DEFAULT_PATTERN_ENV: &str = "VIBECHECK_DEFAULT_PATTERN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RandomizerSettings {
    /// Number of segments generated per cycle.
    pub count: usize,
    /// Inclusive lower bound of each segment, in milliseconds.
    pub min_ms: u32,
    /// Width of the draw; segments fall in `[min_ms, min_ms + span_ms)`.
    pub span_ms: u32,
}

impl Default for RandomizerSettings {
    fn default() -> Self {
        Self {
            count: 10,
            min_ms: 50,
            span_ms: 400,
        }
    }
}

/// Tunables for the playback loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackSettings {
    pub default_pattern_id: String,
    /// Floor for the re-trigger delay so zero-length patterns can't spin.
    pub min_rearm_ms: u64,
    /// Single pulse played when a pattern resolves to nothing.
    pub fallback_ms: u32,
    pub randomizer: RandomizerSettings,
    /// Replaces the built-in catalog when set.
    pub catalog_path: Option<PathBuf>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_pattern_id: "continuous".into(),
            min_rearm_ms: 100,
            fallback_ms: 200,
            randomizer: RandomizerSettings::default(),
            catalog_path: None,
        }
    }
}

impl PlaybackSettings {
    /// Reads settings from `path` if it exists, otherwise starts from defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))?
        } else {
            Self::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Loads from `$VIBECHECK_SETTINGS` (or `fallback_path`) and applies
    /// `$VIBECHECK_DEFAULT_PATTERN` on top.
    pub fn from_env(fallback_path: &Path) -> Result<Self> {
        let path = env::var_os(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| fallback_path.to_path_buf());

        let mut settings = Self::load(&path)?;
        if let Some(id) = env::var(DEFAULT_PATTERN_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            settings.default_pattern_id = id;
        }
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.randomizer.count == 0 {
            bail!("randomizer.count must be greater than zero");
        }
        if self.randomizer.span_ms == 0 {
            bail!("randomizer.spanMs must be greater than zero");
        }
        if self
            .randomizer
            .min_ms
            .checked_add(self.randomizer.span_ms)
            .is_none()
        {
            bail!("randomizer.minMs + randomizer.spanMs must fit in 32 bits");
        }
        if self.fallback_ms == 0 {
            bail!("fallbackMs must be greater than zero");
        }
        if self.min_rearm_ms == 0 {
            bail!("minRearmMs must be greater than zero");
        }
        Ok(())
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::from_path(path),
            None => Ok(Catalog::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("vibecheck-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = env::temp_dir().join("vibecheck-does-not-exist.json");
        let settings = PlaybackSettings::load(&path).unwrap();
        assert_eq!(settings, PlaybackSettings::default());
        assert_eq!(settings.default_pattern_id, "continuous");
        assert_eq!(settings.min_rearm_ms, 100);
        assert_eq!(settings.fallback_ms, 200);
        assert_eq!(settings.randomizer, RandomizerSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_file(
            "partial.json",
            r#"{"defaultPatternId": "heartbeat", "randomizer": {"count": 4}}"#,
        );
        let settings = PlaybackSettings::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.default_pattern_id, "heartbeat");
        assert_eq!(settings.randomizer.count, 4);
        assert_eq!(settings.randomizer.min_ms, 50);
        assert_eq!(settings.randomizer.span_ms, 400);
        assert_eq!(settings.min_rearm_ms, 100);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_file("broken.json", "{ not json");
        let result = PlaybackSettings::load(&path);
        fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse settings"));
    }

    #[test]
    fn rejects_zero_randomizer_span() {
        let path = temp_file("zero-span.json", r#"{"randomizer": {"spanMs": 0}}"#);
        let result = PlaybackSettings::load(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_randomizer_range_past_u32() {
        let mut settings = PlaybackSettings::default();
        settings.randomizer.min_ms = u32::MAX - 10;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("must fit in 32 bits"));

        settings.randomizer.min_ms = u32::MAX - 400;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn catalog_defaults_to_builtin() {
        let catalog = PlaybackSettings::default().catalog().unwrap();
        assert_eq!(catalog, Catalog::builtin());
    }

    #[test]
    fn catalog_path_replaces_builtin() {
        let path = temp_file(
            "catalog.json",
            r#"[{"id": "tick", "name": "Tick", "durations": [30, 970]}]"#,
        );
        let settings = PlaybackSettings {
            catalog_path: Some(path.clone()),
            ..PlaybackSettings::default()
        };
        let catalog = settings.catalog();
        fs::remove_file(&path).unwrap();

        let catalog = catalog.unwrap();
        assert_eq!(catalog.patterns().len(), 1);
        assert!(catalog.contains("tick"));
    }
}
