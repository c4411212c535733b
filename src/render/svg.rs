//! Standalone SVG rendering of a [`Heatmap`].
//!
//! Hover tooltips become `<title>` elements and click-through becomes an
//! `<a target="_blank">` wrapper, so the output works in any browser without
//! script.

use super::commands::{DrawCommand, Fill};
use super::types::Heatmap;

/// Serializes the heatmap's drawing commands into an SVG document.
pub fn to_svg(heatmap: &Heatmap) -> String {
    commands_to_svg(&heatmap.commands())
}

pub fn commands_to_svg(commands: &[DrawCommand]) -> String {
    let mut svg = String::new();
    // Tracks whether each open group was wrapped in a link.
    let mut open: Vec<bool> = Vec::new();

    for command in commands {
        match command {
            DrawCommand::Clear { width, height } => {
                // A clear starts a new document; drop anything emitted so far.
                svg.clear();
                open.clear();
                svg.push_str(&format!(
                    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" font-family="-apple-system, BlinkMacSystemFont, sans-serif">
"#,
                    num(*width),
                    num(*height)
                ));
            }
            DrawCommand::BeginGroup { x, y, interaction } => {
                let indent = "  ".repeat(open.len() + 1);
                match interaction {
                    Some(interaction) => {
                        svg.push_str(&format!(
                            r#"{indent}<a href="{}" target="{}">
"#,
                            escape(&interaction.link),
                            escape(&interaction.target)
                        ));
                        svg.push_str(&format!(
                            r#"{indent}<g transform="translate({}, {})" cursor="pointer">
"#,
                            num(*x),
                            num(*y)
                        ));
                        svg.push_str(&format!(
                            "{indent}  <title>{}</title>\n",
                            escape(&interaction.tooltip.lines().join("\n"))
                        ));
                        open.push(true);
                    }
                    None => {
                        svg.push_str(&format!(
                            r#"{indent}<g transform="translate({}, {})">
"#,
                            num(*x),
                            num(*y)
                        ));
                        open.push(false);
                    }
                }
            }
            DrawCommand::EndGroup => {
                let Some(linked) = open.pop() else {
                    continue;
                };
                let indent = "  ".repeat(open.len() + 1);
                svg.push_str(&format!("{indent}</g>\n"));
                if linked {
                    svg.push_str(&format!("{indent}</a>\n"));
                }
            }
            DrawCommand::LinearGradient { id, from, to } => {
                let indent = "  ".repeat(open.len() + 1);
                svg.push_str(&format!(
                    r#"{indent}<defs>
{indent}  <linearGradient id="{}" x1="0%" y1="0%" x2="100%" y2="0%">
{indent}    <stop offset="0%" stop-color="{}"/>
{indent}    <stop offset="100%" stop-color="{}"/>
{indent}  </linearGradient>
{indent}</defs>
"#,
                    escape(id),
                    from,
                    to
                ));
            }
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                radius,
                fill,
            } => {
                let indent = "  ".repeat(open.len() + 1);
                let fill = match fill {
                    Fill::Solid(color) => color.to_hex(),
                    Fill::Gradient(id) => format!("url(#{})", escape(id)),
                };
                svg.push_str(&format!(
                    r#"{indent}<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}"/>
"#,
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height),
                    fill,
                    r = num(*radius),
                ));
            }
            DrawCommand::Text {
                x,
                y,
                text,
                anchor,
                font_size,
                bold,
                fill,
            } => {
                let indent = "  ".repeat(open.len() + 1);
                let weight = if *bold { r#" font-weight="bold""# } else { "" };
                let fill = fill
                    .map(|c| format!(r#" fill="{c}""#))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"{indent}<text x="{}" y="{}" dy=".35em" text-anchor="{}" font-size="{}px"{weight}{fill}>{}</text>
"#,
                    num(*x),
                    num(*y),
                    anchor.as_str(),
                    num(*font_size),
                    escape(text)
                ));
            }
        }
    }

    // Close anything the command list left open.
    while let Some(linked) = open.pop() {
        svg.push_str("</g>\n");
        if linked {
            svg.push_str("</a>\n");
        }
    }
    if !svg.is_empty() {
        svg.push_str("</svg>\n");
    }
    svg
}

/// Integers print without a fractional part; everything else keeps two decimals.
fn num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeatmapConfig;
    use crate::dataset::{ActivityRecord, DatasetKind};
    use crate::render::{Surface, render};
    use chrono::NaiveDate;

    fn heatmap() -> Heatmap {
        let records = vec![
            ActivityRecord {
                url: "https://example.com/post?a=1&b=2".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 8, 29).unwrap(),
                value: 13,
            },
            ActivityRecord {
                url: "https://example.com/other".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
                value: 88,
            },
        ];
        render(
            &records,
            Surface::new(1200.0, 900.0),
            DatasetKind::Engagement,
            &HeatmapConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_document_shape() {
        let svg = to_svg(&heatmap());
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="950""#));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
        assert_eq!(svg.matches("<a ").count(), 2);
        assert_eq!(svg.matches("</a>").count(), 2);
    }

    #[test]
    fn test_links_and_tooltips_are_escaped() {
        let svg = to_svg(&heatmap());
        assert!(svg.contains(r#"<a href="https://example.com/post?a=1&amp;b=2" target="_blank">"#));
        assert!(svg.contains("<title>Date: 8/29/2024\nEngagement: 13\nClick to view post</title>"));
    }

    #[test]
    fn test_legend_is_drawn() {
        let svg = to_svg(&heatmap());
        assert!(svg.contains(r#"<linearGradient id="value-gradient""#));
        assert!(svg.contains(r##"stop-color="#e8f3ec""##));
        assert!(svg.contains(r##"stop-color="#34c759""##));
        assert!(svg.contains(r#"fill="url(#value-gradient)""#));
        assert!(svg.contains(">Engagement</text>"));
        assert!(svg.contains(">September 2023</text>"));
    }

    #[test]
    fn test_clear_discards_earlier_output() {
        let mut commands = heatmap().commands();
        commands.extend(heatmap().commands());
        let svg = commands_to_svg(&commands);
        assert_eq!(svg.matches("<svg ").count(), 1);
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(30.0), "30");
        assert_eq!(num(-5.0), "-5");
        assert_eq!(num(2.5), "2.50");
    }
}
