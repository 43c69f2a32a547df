use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde::de::{self, Deserializer};

/// Cosmetic transition style forwarded to the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TransitionKind {
    #[default]
    Slide,
    Fade,
    Zoom,
}

impl TransitionKind {
    const ALL: &'static [Self] = &[Self::Slide, Self::Fade, Self::Zoom];
    const NAMES: &'static [&'static str] = &["slide", "fade", "zoom"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Fade => "fade",
            Self::Zoom => "zoom",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown transition '{}', expected one of: {}",
                    raw,
                    Self::NAMES.join(", ")
                )
            })
    }
}

impl<'de> Deserialize<'de> for TransitionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        for kind in Self::ALL {
            if raw == kind.as_str() {
                return Ok(*kind);
            }
        }
        Err(de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Which key presses a carousel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyboardScope {
    /// Every arrow key on the page, whether or not the pointer is over the carousel.
    #[default]
    Global,
    /// Only arrow keys pressed while the pointer is inside the carousel.
    Hovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CarouselOptions {
    /// Start the autoplay timer at construction and resume it on pointer leave.
    pub autoplay: bool,
    /// Time between autoplay advances, in ms.
    pub autoplay_interval_ms: u64,
    /// Transition lock window after a manual navigation, in ms.
    pub transition_duration_ms: u64,
    pub transition: TransitionKind,
    pub show_indicators: bool,
    pub show_controls: bool,
    pub keyboard_scope: KeyboardScope,
}

impl CarouselOptions {
    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.autoplay || self.autoplay_interval_ms > 0,
            "autoplay-interval-ms must be greater than zero when autoplay is enabled"
        );
        Ok(())
    }
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            autoplay: true,
            autoplay_interval_ms: 5000,
            transition_duration_ms: 500,
            transition: TransitionKind::Slide,
            show_indicators: true,
            show_controls: true,
            keyboard_scope: KeyboardScope::Global,
        }
    }
}

/// One candidate container on the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContainerConfig {
    pub name: String,
    /// Slide captions. Absent means the container has no rendering root.
    #[serde(default)]
    pub slides: Option<Vec<String>>,
    /// Render a "{index} of {count}" label.
    #[serde(default)]
    pub counter: bool,
    /// Raw data attributes; `carousel` marks the container for mounting.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Options every mounted carousel starts from before its attributes apply.
    pub defaults: CarouselOptions,
    pub containers: Vec<ContainerConfig>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.defaults
            .validate()
            .context("invalid carousel defaults")?;
        let mut seen = HashSet::new();
        for container in &self.containers {
            ensure!(
                !container.name.trim().is_empty(),
                "container names must not be empty"
            );
            ensure!(
                seen.insert(container.name.as_str()),
                "duplicate container name '{}'",
                container.name
            );
        }
        Ok(self)
    }
}
