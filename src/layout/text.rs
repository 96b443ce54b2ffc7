use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::TextBlock;

pub(super) fn measure_label(text: &str, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let font_size = theme.font_size;
    let font_family = theme.font_family.as_str();
    let max_width = max_label_width_px(config.max_label_width_chars, font_size);

    let mut lines = Vec::new();
    for line in split_lines(text) {
        lines.extend(wrap_line(&line, max_width, font_size, font_family));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let width = lines
        .iter()
        .map(|line| text_metrics::text_width(line, font_size, font_family))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;

    TextBlock {
        lines,
        width,
        height,
    }
}

pub(super) fn split_lines(text: &str) -> Vec<String> {
    text.replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("\\n", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

/// Greedy word wrap. A single word wider than `max_width` stays on its own
/// line.
pub(super) fn wrap_line(line: &str, max_width: f32, font_size: f32, font_family: &str) -> Vec<String> {
    if line.is_empty() || text_metrics::text_width(line, font_size, font_family) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_metrics::text_width(&candidate, font_size, font_family) > max_width
            && !current.is_empty()
        {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn max_label_width_px(max_chars: usize, font_size: f32) -> f32 {
    let chars = max_chars.max(1);
    text_metrics::estimate_text_width(&"n".repeat(chars), font_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_br_tags() {
        assert_eq!(split_lines("a<br/>b"), vec!["a", "b"]);
        assert_eq!(split_lines("a<br>b"), vec!["a", "b"]);
        assert_eq!(split_lines("a\\nb"), vec!["a", "b"]);
    }

    #[test]
    fn short_labels_are_not_wrapped() {
        assert_eq!(wrap_line("Ja", 1000.0, 12.0, "sans-serif"), vec!["Ja"]);
    }

    #[test]
    fn long_labels_wrap_on_words() {
        let lines = wrap_line(
            "this is a rather long label that should be wrapped",
            60.0,
            12.0,
            "sans-serif",
        );
        assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
        assert_eq!(
            lines.join(" "),
            "this is a rather long label that should be wrapped"
        );
    }

    #[test]
    fn empty_label_has_one_line() {
        let block = measure_label("", &Theme::default(), &LayoutConfig::default());
        assert_eq!(block.lines, vec![String::new()]);
        assert!(block.height > 0.0);
    }
}
