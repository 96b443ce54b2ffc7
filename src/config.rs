use crate::ir::Direction;
use crate::path::{CornerStyle, DEFAULT_CORNER_RADIUS};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Fixed box size handed to the layout engine for every node.
    pub node_width: f32,
    pub node_height: f32,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin: f32,
    pub direction: Direction,
    pub ranker: Ranker,
    pub label_line_height: f32,
    pub max_label_width_chars: usize,
}

/// Rank assignment strategy passed to dagre.
///
/// `NetworkSimplex` does not terminate on some graphs with cross-rank edges,
/// so the default is `TightTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ranker {
    NetworkSimplex,
    #[default]
    TightTree,
    LongestPath,
}

impl Ranker {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "network-simplex" => Some(Self::NetworkSimplex),
            "tight-tree" => Some(Self::TightTree),
            "longest-path" => Some(Self::LongestPath),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkSimplex => "network-simplex",
            Self::TightTree => "tight-tree",
            Self::LongestPath => "longest-path",
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 150.0,
            node_height: 35.0,
            node_spacing: 80.0,
            rank_spacing: 80.0,
            margin: 8.0,
            direction: Direction::Down,
            ranker: Ranker::default(),
            label_line_height: 1.4,
            max_label_width_chars: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    pub corner_radius: f32,
    pub clamp_radius: bool,
    pub label_padding_x: f32,
    pub label_padding_y: f32,
    pub arrow: bool,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            corner_radius: DEFAULT_CORNER_RADIUS,
            clamp_radius: false,
            label_padding_x: 4.0,
            label_padding_y: 2.0,
            arrow: true,
        }
    }
}

impl EdgeConfig {
    pub fn corner_style(&self) -> CornerStyle {
        CornerStyle {
            radius: self.corner_radius,
            clamp: self.clamp_radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub edge: EdgeConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeOverrides {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_text_color: Option<String>,
    node_border_color: Option<String>,
    edge_color: Option<String>,
    edge_width: Option<f32>,
    edge_label_color: Option<String>,
    edge_label_background: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    margin: Option<f32>,
    direction: Option<String>,
    ranker: Option<String>,
    label_line_height: Option<f32>,
    max_label_width_chars: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EdgeConfigFile {
    corner_radius: Option<f32>,
    clamp_radius: Option<bool>,
    label_padding_x: Option<f32>,
    label_padding_y: Option<f32>,
    arrow: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeOverrides>,
    layout: Option<LayoutConfigFile>,
    edge: Option<EdgeConfigFile>,
    background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Applies a camelCase JSON (or JSON5) document of optional overrides on top
/// of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(strict_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config: {strict_err}"))?,
    };

    if let Some(name) = parsed.theme.as_deref() {
        match Theme::by_name(name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_overrides(&mut config.theme, vars);
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v;
        }
        if let Some(v) = layout.margin {
            config.layout.margin = v;
        }
        if let Some(v) = layout.direction {
            config.layout.direction = Direction::from_token(&v)
                .ok_or_else(|| anyhow::anyhow!("unknown layout direction `{v}`"))?;
        }
        if let Some(v) = layout.ranker {
            config.layout.ranker = Ranker::from_token(&v)
                .ok_or_else(|| anyhow::anyhow!("unknown layout ranker `{v}`"))?;
        }
        if let Some(v) = layout.label_line_height {
            config.layout.label_line_height = v;
        }
        if let Some(v) = layout.max_label_width_chars {
            config.layout.max_label_width_chars = v;
        }
    }

    if let Some(edge) = parsed.edge {
        if let Some(v) = edge.corner_radius {
            config.edge.corner_radius = v;
        }
        if let Some(v) = edge.clamp_radius {
            config.edge.clamp_radius = v;
        }
        if let Some(v) = edge.label_padding_x {
            config.edge.label_padding_x = v;
        }
        if let Some(v) = edge.label_padding_y {
            config.edge.label_padding_y = v;
        }
        if let Some(v) = edge.arrow {
            config.edge.arrow = v;
        }
    }

    config.render.background = parsed
        .background
        .unwrap_or_else(|| config.theme.background.clone());

    Ok(config)
}

fn apply_theme_overrides(theme: &mut Theme, vars: ThemeOverrides) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size {
        theme.font_size = v;
    }
    if let Some(v) = vars.node_fill {
        theme.node_fill = v;
    }
    if let Some(v) = vars.node_text_color {
        theme.node_text_color = v;
    }
    if let Some(v) = vars.node_border_color {
        theme.node_border_color = v;
    }
    if let Some(v) = vars.edge_color {
        theme.edge_color = v;
    }
    if let Some(v) = vars.edge_width {
        theme.edge_width = v;
    }
    if let Some(v) = vars.edge_label_color {
        theme.edge_label_color = v;
    }
    if let Some(v) = vars.edge_label_background {
        theme.edge_label_background = v;
    }
    if let Some(v) = vars.background {
        theme.background = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_layered_widget() {
        let config = Config::default();
        assert_eq!(config.layout.node_width, 150.0);
        assert_eq!(config.layout.node_height, 35.0);
        assert_eq!(config.layout.node_spacing, 80.0);
        assert_eq!(config.layout.rank_spacing, 80.0);
        assert_eq!(config.layout.direction, Direction::Down);
        assert_eq!(config.edge.corner_radius, 4.0);
        assert!(!config.edge.clamp_radius);
    }

    #[test]
    fn overrides_are_applied() {
        let raw = r##"{
            "theme": "modern",
            "themeVariables": { "fontSize": 15, "edgeColor": "#ff0000" },
            "layout": { "nodeHeight": 50, "direction": "RIGHT" },
            "edge": { "cornerRadius": 8, "clampRadius": true }
        }"##;
        let config = parse_config(raw).expect("config parses");
        assert_eq!(config.theme.font_size, 15.0);
        assert_eq!(config.theme.edge_color, "#ff0000");
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
        assert_eq!(config.layout.node_height, 50.0);
        assert_eq!(config.layout.node_width, 150.0);
        assert_eq!(config.layout.direction, Direction::Right);
        assert_eq!(config.edge.corner_style(), CornerStyle::clamped(8.0));
    }

    #[test]
    fn bad_direction_is_rejected() {
        let err = parse_config(r#"{ "layout": { "direction": "UP" } }"#).unwrap_err();
        assert!(err.to_string().contains("UP"));
    }

    #[test]
    fn ranker_defaults_to_tight_tree_and_can_be_overridden() {
        assert_eq!(Config::default().layout.ranker, Ranker::TightTree);
        let config = parse_config(r#"{ "layout": { "ranker": "longest-path" } }"#).expect("config");
        assert_eq!(config.layout.ranker, Ranker::LongestPath);
        assert_eq!(config.layout.ranker.as_str(), "longest-path");
        assert!(parse_config(r#"{ "layout": { "ranker": "fastest" } }"#).is_err());
    }

    #[test]
    fn relaxed_json_is_accepted() {
        let config = parse_config("{ edge: { cornerRadius: 6, }, // rounder\n }").expect("json5");
        assert_eq!(config.edge.corner_radius, 6.0);
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config, Config::default());
    }
}
