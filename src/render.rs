use crate::config::{Config, RenderConfig};
use crate::geometry::Point;
use crate::layout::routing::fallback_points;
use crate::layout::{EdgeLayout, Layout, TextBlock};
use crate::path::{EdgePath, build_path_with, polyline_path};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Minimum canvas edge, so tiny graphs still produce a usable image.
const MIN_CANVAS: f32 = 200.0;

/// A drawable edge: the SVG path plus where its label goes.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub path: EdgePath,
    pub label_anchor: Point,
    /// `false` when the edge took the fallback step renderer.
    pub routed: bool,
}

/// Path and label anchor for one edge.
///
/// Routed edges go through the curved-corner builder and the midpoint label
/// placer. Edges without routing get a plain step polyline between the two
/// boxes with the label halfway between its ends. `None` only when an
/// endpoint is missing from the layout.
pub fn edge_geometry(layout: &Layout, edge: &EdgeLayout, config: &Config) -> Option<EdgeGeometry> {
    if let Some(section) = edge.section() {
        let path = build_path_with(
            section.start_point,
            &section.bend_points,
            section.end_point,
            config.edge.corner_style(),
        );
        return Some(EdgeGeometry {
            path,
            label_anchor: section.label_point(),
            routed: true,
        });
    }

    let from = layout.node(&edge.from)?;
    let to = layout.node(&edge.to)?;
    let points = fallback_points(from, to, layout.direction);
    let (first, last) = (points.first()?, points.last()?);
    Some(EdgeGeometry {
        label_anchor: first.midpoint(*last),
        path: polyline_path(&points),
        routed: false,
    })
}

pub fn render_svg(layout: &Layout, theme: &Theme, config: &Config) -> String {
    let mut svg = String::new();
    let width = layout.width.max(MIN_CANVAS);
    let height = layout.height.max(MIN_CANVAS);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.render.background
    ));

    if config.edge.arrow {
        svg.push_str("<defs>");
        svg.push_str(&format!(
            "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
            theme.edge_color
        ));
        svg.push_str("</defs>");
    }

    let marker = if config.edge.arrow {
        " marker-end=\"url(#arrow)\""
    } else {
        ""
    };

    // Paths first, labels on top of every path.
    let mut labels = Vec::new();
    for edge in &layout.edges {
        let Some(geometry) = edge_geometry(layout, edge, config) else {
            tracing::warn!(edge = %edge.id, "edge endpoints missing from layout, skipped");
            continue;
        };
        let class = if geometry.routed { "edge" } else { "edge fallback" };
        svg.push_str(&format!(
            "<path class=\"{class}\" data-id=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{marker}/>",
            escape_xml(&edge.id),
            geometry.path,
            theme.edge_color,
            theme.edge_width,
        ));
        if let Some(label) = edge.label.as_ref() {
            labels.push((edge, geometry.label_anchor, label));
        }
    }

    for (edge, anchor, label) in labels {
        let pad_x = config.edge.label_padding_x;
        let pad_y = config.edge.label_padding_y;
        let rect_x = anchor.x - label.width / 2.0 - pad_x;
        let rect_y = anchor.y - label.height / 2.0 - pad_y;
        let rect_w = label.width + pad_x * 2.0;
        let rect_h = label.height + pad_y * 2.0;
        svg.push_str(&format!(
            "<g class=\"edge-label\" data-id=\"{}\"><rect x=\"{rect_x:.2}\" y=\"{rect_y:.2}\" width=\"{rect_w:.2}\" height=\"{rect_h:.2}\" rx=\"2\" ry=\"2\" fill=\"{}\"/>",
            escape_xml(&edge.id),
            theme.edge_label_background,
        ));
        svg.push_str(&text_block_svg(
            anchor,
            label,
            theme,
            &theme.edge_label_color,
            config,
        ));
        svg.push_str("</g>");
    }

    for node in layout.nodes.values() {
        svg.push_str(&format!(
            "<g class=\"node\" data-id=\"{}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            escape_xml(&node.id),
            node.x,
            node.y,
            node.width,
            node.height,
            theme.node_fill,
            theme.node_border_color
        ));
        svg.push_str(&text_block_svg(
            node.center(),
            &node.label,
            theme,
            &theme.node_text_color,
            config,
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn text_block_svg(center: Point, label: &TextBlock, theme: &Theme, fill: &str, config: &Config) -> String {
    let line_height = theme.font_size * config.layout.label_line_height;
    let total_height = label.lines.len() as f32 * line_height;
    // First baseline sits one font size below the block's top edge, nudged
    // so the block is visually centred.
    let start_y = center.y - total_height / 2.0 + theme.font_size;
    let x = center.x;

    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{fill}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
    );
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("invalid canvas size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Section;
    use crate::ir::{Edge, Graph};
    use crate::layout::{EngineOutput, PlacedNode, RoutedEdge, StaticEngine, compute_layout};

    fn layout_with(sections: Vec<Section>) -> Layout {
        let mut graph = Graph::new();
        graph.ensure_node("a", Some("Alpha & co".to_string()));
        graph.ensure_node("b", Some("Beta".to_string()));
        graph.add_edge(Edge::new("a", "b").with_label("Ja"));
        let output = EngineOutput {
            nodes: vec![
                PlacedNode {
                    id: "a".to_string(),
                    x: 10.0,
                    y: 10.0,
                },
                PlacedNode {
                    id: "b".to_string(),
                    x: 240.0,
                    y: 125.0,
                },
            ],
            edges: vec![RoutedEdge {
                id: "ea-b".to_string(),
                sections,
            }],
        };
        let config = Config::default();
        compute_layout(&graph, &StaticEngine::new(output), &config.theme, &config.layout)
            .expect("layout")
    }

    fn routed_section() -> Section {
        Section::new(
            Point::new(85.0, 45.0),
            vec![Point::new(85.0, 85.0), Point::new(315.0, 85.0)],
            Point::new(315.0, 125.0),
        )
    }

    #[test]
    fn routed_edges_use_curved_corners() {
        let layout = layout_with(vec![routed_section()]);
        let config = Config::default();
        let edge = layout.edge("ea-b").expect("edge");
        let geometry = edge_geometry(&layout, edge, &config).expect("geometry");
        assert!(geometry.routed);
        assert_eq!(
            geometry.path.to_string(),
            "M85,45 L85,81 Q85,85 89,85 L311,85 Q315,85 315,89 L315,125"
        );
        assert_eq!(geometry.label_anchor, Point::new(200.0, 85.0));
    }

    #[test]
    fn unrouted_edges_fall_back_to_step_polyline() {
        let layout = layout_with(Vec::new());
        let config = Config::default();
        let edge = layout.edge("ea-b").expect("edge");
        let geometry = edge_geometry(&layout, edge, &config).expect("geometry");
        assert!(!geometry.routed);
        assert_eq!(
            geometry.path.to_string(),
            "M85,45 L85,85 L315,85 L315,125"
        );
        assert_eq!(geometry.label_anchor, Point::new(200.0, 85.0));
    }

    #[test]
    fn svg_contains_nodes_labels_and_paths() {
        let layout = layout_with(vec![routed_section()]);
        let config = Config::default();
        let svg = render_svg(&layout, &config.theme, &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Alpha &amp; co"));
        assert!(svg.contains("Beta"));
        assert!(svg.contains(">Ja</tspan>"));
        assert!(svg.contains("d=\"M85,45 L85,81 Q85,85 89,85"));
        assert!(svg.contains("marker-end=\"url(#arrow)\""));
    }

    #[test]
    fn arrows_can_be_disabled() {
        let layout = layout_with(vec![routed_section()]);
        let mut config = Config::default();
        config.edge.arrow = false;
        let svg = render_svg(&layout, &config.theme, &config);
        assert!(!svg.contains("marker"));
    }
}
