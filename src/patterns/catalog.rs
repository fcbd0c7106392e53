use std::{collections::HashSet, fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// How a pattern produces the sequence handed to the haptic primitive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    /// Plays `durations` as declared.
    #[default]
    Fixed,
    /// Ignores `durations` and draws a fresh sequence on every cycle.
    Randomized,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    pub name: String,
    /// Milliseconds, alternating vibrate/pause, starting with vibrate.
    #[serde(default)]
    pub durations: Vec<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: PatternKind,
}

impl Pattern {
    pub fn fixed(id: &str, name: &str, durations: &[u32], description: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            durations: durations.to_vec(),
            description: description.into(),
            kind: PatternKind::Fixed,
        }
    }

    pub fn randomized(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            durations: Vec::new(),
            description: description.into(),
            kind: PatternKind::Randomized,
        }
    }
}

/// Ordered, immutable set of patterns with unique ids.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog {
    patterns: Vec<Pattern>,
}

impl Catalog {
    pub fn new(patterns: Vec<Pattern>) -> Result<Self> {
        if patterns.is_empty() {
            bail!("pattern catalog must contain at least one pattern");
        }

        let mut seen = HashSet::new();
        for pattern in &patterns {
            if !seen.insert(pattern.id.as_str()) {
                bail!("duplicate pattern id '{}'", pattern.id);
            }
            if pattern.kind == PatternKind::Fixed && pattern.durations.is_empty() {
                warn!(
                    "pattern '{}' has no durations; it will play the fallback pulse",
                    pattern.id
                );
            }
        }

        Ok(Self { patterns })
    }

    /// The six patterns the app ships with.
    pub fn builtin() -> Self {
        #[rustfmt::skip]
        let sos = [
            100, 100, 100, 100, 100, 100, // ...
            300, 100, 300, 100, 300, 100, // ---
            100, 100, 100, 100, 100, 100, // ...
        ];

        Self {
            patterns: vec![
                Pattern::fixed(
                    "continuous",
                    "Continuous",
                    &[10_000],
                    "Steady, uninterrupted vibration",
                ),
                Pattern::fixed("pulse-slow", "Slow Pulse", &[500, 500], "Rhythmic slow pulsing"),
                Pattern::fixed("pulse-fast", "Fast Pulse", &[200, 200], "Rapid, energetic pulsing"),
                Pattern::fixed(
                    "heartbeat",
                    "Heartbeat",
                    &[100, 100, 100, 800],
                    "Mimics a human heartbeat",
                ),
                Pattern::fixed("sos", "S.O.S.", &sos, "Standard distress signal"),
                Pattern::randomized("random", "Randomizer", "Chaotic, random patterns"),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let patterns: Vec<Pattern> =
            serde_json::from_str(json).context("failed to parse pattern catalog")?;
        Self::new(patterns)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern catalog from {}", path.display()))?;
        Self::from_json_str(&contents)
            .map_err(|err| anyhow!("invalid pattern catalog {}: {err:#}", path.display()))
    }

    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn first(&self) -> &Pattern {
        // `new` and `builtin` never produce an empty catalog.
        &self.patterns[0]
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}
