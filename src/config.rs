use crate::gfx::math::Color;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_position")]
    pub position: Position,

    #[serde(default = "default_margins")]
    pub margins: Margins,

    #[serde(default = "default_plot_size")]
    pub plot_size: Size,

    #[serde(default = "default_controls_height")]
    pub controls_height: u32,

    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    #[serde(default = "default_cycle_pause_ms")]
    pub cycle_pause_ms: u64,

    #[serde(default = "default_initial")]
    pub initial: Initial,

    #[serde(default = "default_theme")]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub anchor: Anchor,
    pub exclusive_zone: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Values the controls start from. They pass through the same range and
/// step guards as pointer input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Initial {
    pub power: f64,
    pub elasticity: f64,
    pub cycle_duration_ms: u64,
    pub show_marker: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub grid: String,
    pub axis: String,
    pub quarter: String,
    pub label: String,
    pub curve: String,
    pub rectangle: String,
    pub marker: String,
    pub panel: String,
    pub track: String,
    pub accent: String,
}

/// `Theme` with every color parsed.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub axis: Color,
    pub quarter: Color,
    pub label: Color,
    pub curve: Color,
    pub rectangle: Color,
    pub marker: Color,
    pub panel: Color,
    pub track: Color,
    pub accent: Color,
}

impl Theme {
    pub fn palette(&self) -> Result<Palette> {
        Ok(Palette {
            background: Color::from_hex(&self.background)?,
            grid: Color::from_hex(&self.grid)?,
            axis: Color::from_hex(&self.axis)?,
            quarter: Color::from_hex(&self.quarter)?,
            label: Color::from_hex(&self.label)?,
            curve: Color::from_hex(&self.curve)?,
            rectangle: Color::from_hex(&self.rectangle)?,
            marker: Color::from_hex(&self.marker)?,
            panel: Color::from_hex(&self.panel)?,
            track: Color::from_hex(&self.track)?,
            accent: Color::from_hex(&self.accent)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            position: default_position(),
            margins: default_margins(),
            plot_size: default_plot_size(),
            controls_height: default_controls_height(),
            frame_interval_ms: default_frame_interval_ms(),
            cycle_pause_ms: default_cycle_pause_ms(),
            initial: default_initial(),
            theme: default_theme(),
        }
    }
}

fn default_position() -> Position {
    Position {
        anchor: Anchor::Center,
        exclusive_zone: 0,
    }
}

fn default_margins() -> Margins {
    Margins {
        top: 8,
        right: 8,
        bottom: 8,
        left: 8,
    }
}

fn default_plot_size() -> Size {
    Size {
        width: 800,
        height: 400,
    }
}

fn default_controls_height() -> u32 {
    96
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_cycle_pause_ms() -> u64 {
    150
}

fn default_initial() -> Initial {
    Initial {
        power: 0.3,
        elasticity: 3.0,
        cycle_duration_ms: 1000,
        show_marker: false,
    }
}

fn default_theme() -> Theme {
    Theme {
        background: "#ffffff".to_string(),
        grid: "#dddddd".to_string(),
        axis: "#bbbbbb".to_string(),
        quarter: "#000000".to_string(),
        label: "#555555".to_string(),
        curve: "#ff000080".to_string(),
        rectangle: "#2fcc44".to_string(),
        marker: "#ff000080".to_string(),
        panel: "#f4f4f4".to_string(),
        track: "#d0d0d0".to_string(),
        accent: "#4a9eff".to_string(),
    }
}

impl Default for Position {
    fn default() -> Self {
        default_position()
    }
}

impl Default for Margins {
    fn default() -> Self {
        default_margins()
    }
}

impl Default for Size {
    fn default() -> Self {
        default_plot_size()
    }
}

impl Default for Initial {
    fn default() -> Self {
        default_initial()
    }
}

impl Default for Theme {
    fn default() -> Self {
        default_theme()
    }
}

impl Config {
    /// Reads `$XDG_CONFIG_HOME/overshoot/config.toml`, or the defaults when
    /// the file does not exist. Nothing is ever written back.
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("overshoot").join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config = Self::from_toml_str(&contents)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.plot_size.width == 0 || config.plot_size.height == 0 {
            anyhow::bail!("plot_size must be non-zero, got {:?}", config.plot_size);
        }
        if config.frame_interval_ms == 0 {
            anyhow::bail!("frame_interval_ms must be non-zero");
        }
        config.theme.palette()?;
        Ok(config)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn cycle_pause(&self) -> Duration {
        Duration::from_millis(self.cycle_pause_ms)
    }

    /// Full surface size: the plot with the control strip below it.
    pub fn surface_size(&self) -> [u32; 2] {
        [self.plot_size.width, self.plot_size.height + self.controls_height]
    }
}
