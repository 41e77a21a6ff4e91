//! Application settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chart::source::DEFAULT_SOURCE;
use crate::chart::{DataSource, Placement};
use crate::controls::MovementParams;
use crate::i18n::Lang;

/// Where chart data is read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// File path or http(s) URL of the CSV dataset
    pub source: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl DataSettings {
    pub fn data_source(&self) -> DataSource {
        DataSource::parse(&self.source)
    }
}

/// Placement of each chart in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub bar: Placement,
    pub line: Placement,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            bar: Placement::at([-100.0, 0.0, 0.0]),
            line: Placement::at([100.0, 0.0, 0.0]),
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Ground plane color RGB
    pub ground_color: [u8; 3],
    pub ground_size: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Initial eye position
    pub eye: [f32; 3],
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [0, 0, 0],
            ground_color: [10, 10, 10],
            ground_size: 1000.0,
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            eye: [0.0, 50.0, 100.0],
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
    pub language: Lang,
    /// Show the diagnostic log panel
    pub show_debug: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            language: Lang::default(),
            show_debug: true,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub data: DataSettings,
    pub movement: MovementParams,
    pub charts: ChartSettings,
    pub viewport: ViewportSettings,
    pub ui: UiSettings,
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockwalk", "stockwalk")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the config dir, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Save settings to the config dir
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("failed to save settings to {}: {e}", path.display());
            }
        }
    }

    /// `None` when the file is missing or unreadable
    pub fn load_from(path: &Path) -> Option<Self> {
        let json = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("ignoring malformed settings {}: {e}", path.display());
                None
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
