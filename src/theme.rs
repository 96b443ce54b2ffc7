use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_text_color: String,
    pub node_border_color: String,
    pub edge_color: String,
    pub edge_width: f32,
    pub edge_label_color: String,
    pub edge_label_background: String,
    pub background: String,
}

impl Theme {
    /// Light palette close to the stock React Flow look.
    pub fn flow_default() -> Self {
        Self {
            font_family: "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif"
                .to_string(),
            font_size: 12.0,
            node_fill: "#FFFFFF".to_string(),
            node_text_color: "#222222".to_string(),
            node_border_color: "#1A192B".to_string(),
            edge_color: "#B1B1B7".to_string(),
            edge_width: 1.0,
            edge_label_color: "#222222".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_fill: "#F8FAFF".to_string(),
            node_text_color: "#1C2430".to_string(),
            node_border_color: "#C7D2E5".to_string(),
            edge_color: "#7A8AA6".to_string(),
            edge_width: 1.4,
            edge_label_color: "#1C2430".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "default" | "flow" => Some(Self::flow_default()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::flow_default()
    }
}
