use stepflow_renderer::{Direction, RenderOptions, Theme, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    direction: Option<String>,
    corner_radius: Option<f32>,
    clamp_radius: Option<bool>,
    node_width: Option<f32>,
    node_height: Option<f32>,
}

fn build_render_options(options: GraphRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = match options.theme.as_deref() {
        None => RenderOptions::flow_default(),
        Some(name) => {
            let theme = Theme::by_name(name).ok_or_else(|| format!("unknown theme `{name}`"))?;
            RenderOptions::default().with_theme(theme)
        }
    };
    let config = &mut render_options.config;

    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(direction) = options.direction {
        config.layout.direction = Direction::from_token(&direction)
            .ok_or_else(|| format!("unknown direction `{direction}`"))?;
    }
    if let Some(radius) = options.corner_radius {
        config.edge.corner_radius = radius;
    }
    if let Some(clamp) = options.clamp_radius {
        config.edge.clamp_radius = clamp;
    }
    if let Some(width) = options.node_width {
        config.layout.node_width = width;
    }
    if let Some(height) = options.node_height {
        config.layout.node_height = height;
    }

    Ok(render_options)
}

#[wasm_bindgen]
pub fn render_graph_svg(input: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<GraphRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        GraphRenderOptions::default()
    };

    let render_options = build_render_options(options).map_err(|error| JsValue::from_str(&error))?;
    render_with_options(input, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}
