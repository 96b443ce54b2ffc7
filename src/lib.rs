#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod events;
pub mod geometry;
pub mod ir;
pub mod label;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod path;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, Ranker, load_config};
pub use events::{EdgeEvent, ElementView, EventAdapter, EventError, GraphEvent, NodeEvent};
pub use geometry::{Point, Section};
pub use ir::{Direction, Edge, Graph, Node};
pub use label::{MiddleBends, place_label};
pub use layout::{
    LayeredEngine, Layout, LayoutEngine, LayoutError, LayoutSession, StaticEngine, compute_layout,
};
pub use parser::{ParseError, parse_graph};
pub use path::{Corner, CornerStyle, EdgePath, PathCommand, build_path, classify_corner};
pub use render::render_svg;
pub use theme::Theme;

/// Everything needed to turn graph text into SVG in one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub config: Config,
}

impl RenderOptions {
    pub fn flow_default() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self::default().with_theme(Theme::modern())
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.config.render.background = theme.background.clone();
        self.config.theme = theme;
        self
    }
}

/// Parses `input`, lays it out with [`LayeredEngine`] and renders SVG.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    render_with_engine(input, &LayeredEngine, &options)
}

pub fn render_with_engine(
    input: &str,
    engine: &dyn LayoutEngine,
    options: &RenderOptions,
) -> anyhow::Result<String> {
    let config = &options.config;
    let graph = parser::parse_graph_with_direction(input, config.layout.direction)?;
    let layout = compute_layout(&graph, engine, &config.theme, &config.layout)?;
    Ok(render_svg(&layout, &config.theme, config))
}
