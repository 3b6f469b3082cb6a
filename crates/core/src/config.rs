use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::{Color, ColorOrder, PALETTE};
use crate::loader::DEFAULT_URL;
use crate::treemap::{LayoutOptions, PHI};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid palette color {0:?}, expected #rrggbb")]
    Palette(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 20.0,
            left: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    pub width: f64,
    pub height: f64,
    pub swatch: f64,
    pub gutter: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            width: 540.0,
            height: 100.0,
            swatch: 20.0,
            gutter: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_x: 20.0,
            offset_y: -150.0,
            opacity: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub inset_x: f64,
    pub first_line: f64,
    pub line_height: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            inset_x: 5.0,
            first_line: 12.0,
            line_height: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    pub description: String,
    pub data_url: String,
    /// Outer size of the chart svg, margins included.
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub padding: f64,
    pub ratio: f64,
    /// Viewport width the legend is centred against.
    pub viewport_width: f64,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub label: LabelConfig,
    pub palette: Vec<String>,
    pub color_order: ColorOrder,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Video Game Sales".to_string(),
            description: "Top 100 Most Sold Video Games Grouped by Platform".to_string(),
            data_url: DEFAULT_URL.to_string(),
            width: 1200.0,
            height: 600.0,
            margin: Margin::default(),
            padding: 1.0,
            ratio: PHI,
            viewport_width: 1280.0,
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            label: LabelConfig::default(),
            palette: PALETTE.iter().map(Color::hex).collect(),
            color_order: ColorOrder::FirstSeen,
        }
    }
}

impl RenderConfig {
    /// Drawing area inside the margins.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            width: (self.width - self.margin.left - self.margin.right).max(0.0),
            height: (self.height - self.margin.top - self.margin.bottom).max(0.0),
            padding: self.padding,
            ratio: self.ratio,
        }
    }

    pub fn palette_colors(&self) -> Result<Vec<Color>, ConfigError> {
        self.palette
            .iter()
            .map(|s| Color::from_hex(s).ok_or_else(|| ConfigError::Palette(s.clone())))
            .collect()
    }
}

/// Read a JSON config over the defaults. Missing keys keep their defaults.
pub fn load_config(path: Option<&Path>) -> Result<RenderConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: RenderConfig = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    config.palette_colors()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_give_inner_chart_area() {
        let opts = RenderConfig::default().layout_options();
        assert_eq!(opts.width, 1160.0);
        assert_eq!(opts.height, 560.0);
        assert_eq!(opts.padding, 1.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: RenderConfig =
            serde_json::from_str(r#"{ "width": 800, "legend": { "swatch": 16 }, "color_order": "sorted" }"#)
                .unwrap();
        assert_eq!(cfg.width, 800.0);
        assert_eq!(cfg.height, 600.0);
        assert_eq!(cfg.legend.swatch, 16.0);
        assert_eq!(cfg.legend.gutter, 10.0);
        assert_eq!(cfg.color_order, ColorOrder::Sorted);
    }

    #[test]
    fn default_palette_parses() {
        let colors = RenderConfig::default().palette_colors().unwrap();
        assert_eq!(colors, PALETTE.to_vec());
    }

    #[test]
    fn bad_palette_entry_is_rejected() {
        let path = std::env::temp_dir().join(format!("salesmap-cfg-{}.json", std::process::id()));
        std::fs::write(&path, r##"{ "palette": ["#000000", "blue"] }"##).unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Palette(ref s) if s == "blue"));
        std::fs::remove_file(path).ok();
    }
}
