use std::fmt::Write as _;

use tracing::debug;

use super::{backend_constructors, escape_html, symbol_text, Artifact, Backend, Layout, Renderer};
use crate::formats::OutputFormat;
use crate::helper::matrix_svg_path;
use crate::options::{RenderOptions, ResolvedOptions};
use crate::symbol::{placeholder, Symbol};
use crate::types;
use crate::{Error, Result};

const NAME: &str = "svg";

/// Width of the placeholder drawing.
const PLACEHOLDER_WIDTH: u32 = 300;
/// Extra height of the placeholder drawing when text is shown.
const PLACEHOLDER_TEXT_BLOCK: u32 = 30;
/// Width of one placeholder bar.
const PLACEHOLDER_BAR: u32 = 2;

/// Vector backend producing standalone SVG documents.
///
/// Symbols the generator cannot produce are drawn with the placeholder
/// construction from [`placeholder`] instead of failing.
#[derive(Clone, Default)]
pub struct SvgRenderer {
    backend: Backend,
}

backend_constructors!(SvgRenderer);

fn open_svg(out: &mut String, width: u32, height: u32, background: &str, placeholder: bool) {
    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\""
    );
    if placeholder {
        out.push_str(" data-placeholder=\"true\"");
    }
    out.push_str(">\n");
    let _ = writeln!(out, "\t<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"{background}\"/>");
}

fn push_text(out: &mut String, text: &str, x: f32, baseline: u32, anchor: &str, options: &ResolvedOptions) {
    let _ = writeln!(
        out,
        "\t<text x=\"{x}\" y=\"{baseline}\" text-anchor=\"{anchor}\" font-family=\"monospace\" font-size=\"{}\" fill=\"{}\">{}</text>",
        options.font_size,
        options.line_color,
        escape_html(text)
    );
}

/// SVG document for a genuine symbol.
pub(crate) fn symbol_svg(symbol: &Symbol, options: &ResolvedOptions) -> Result<String> {
    let layout = Layout::new(symbol, options).map_err(|e| Error::render(NAME, e))?;
    let mut out = String::new();
    open_svg(&mut out, layout.width, layout.height, &options.background.to_string(), false);

    match symbol {
        Symbol::Linear(linear) => {
            let _ = writeln!(out, "\t<g fill=\"{}\">", options.line_color);
            for (start, len) in linear.bars() {
                let _ = writeln!(
                    out,
                    "\t\t<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
                    layout.x + start as u32 * layout.unit,
                    layout.y,
                    len as u32 * layout.unit,
                    layout.symbol_height
                );
            }
            out.push_str("\t</g>\n");
        }
        Symbol::Matrix(matrix) => {
            let _ = writeln!(
                out,
                "\t<path d=\"{}\" fill=\"{}\"/>",
                matrix_svg_path(matrix, layout.x, layout.y, layout.unit),
                options.line_color
            );
        }
    }

    if let Some(top) = layout.text_top {
        let x = match options.text_align {
            crate::options::TextAlign::Left => layout.x as f32,
            crate::options::TextAlign::Center => layout.x as f32 + layout.symbol_width as f32 / 2.0,
            crate::options::TextAlign::Right => (layout.x + layout.symbol_width) as f32,
        };
        push_text(
            &mut out,
            symbol_text(symbol),
            x,
            top + options.font_size,
            options.text_align.as_svg_anchor(),
            options,
        );
    }

    out.push_str("</svg>\n");
    Ok(out)
}

/// Placeholder drawing used when no genuine symbol is available.
///
/// 2D types get one centered square; linear types get `code % 5 + 1` bars per
/// character, each bar two units wide and advancing by four.
pub(crate) fn placeholder_svg(data: &str, symbology: &str, options: &ResolvedOptions) -> String {
    let bar_height = options.height;
    let height = if options.display_value {
        bar_height.saturating_add(PLACEHOLDER_TEXT_BLOCK)
    } else {
        bar_height
    };

    let mut out = String::new();
    open_svg(&mut out, PLACEHOLDER_WIDTH, height, &options.background.to_string(), true);

    if types::is_two_dimensional(symbology) {
        let side = bar_height.min(PLACEHOLDER_WIDTH) * 4 / 5;
        let _ = writeln!(
            out,
            "\t<rect x=\"{}\" y=\"{}\" width=\"{side}\" height=\"{side}\" fill=\"{}\"/>",
            (PLACEHOLDER_WIDTH - side) / 2,
            (bar_height - side) / 2,
            options.line_color
        );
    } else {
        let _ = writeln!(out, "\t<g fill=\"{}\">", options.line_color);
        let mut x = options.margin_left;
        for count in placeholder::bar_counts(data) {
            for _ in 0..count {
                let _ = writeln!(
                    out,
                    "\t\t<rect x=\"{x}\" y=\"0\" width=\"{PLACEHOLDER_BAR}\" height=\"{bar_height}\"/>"
                );
                x = x.saturating_add(PLACEHOLDER_BAR * 2);
            }
        }
        out.push_str("\t</g>\n");
    }

    if options.display_value {
        push_text(
            &mut out,
            data,
            PLACEHOLDER_WIDTH as f32 / 2.0,
            bar_height + PLACEHOLDER_TEXT_BLOCK - 10,
            "middle",
            options,
        );
    }

    out.push_str("</svg>\n");
    out
}

impl Renderer for SvgRenderer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Svg
    }

    fn render(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        let options = self.backend.resolve(NAME, options)?;
        let svg = match self.backend.symbol(data, symbology, &options) {
            Ok(symbol) => symbol_svg(&symbol, &options)?,
            Err(err) => {
                debug!(symbology, error = %err, "svg falling back to placeholder drawing");
                placeholder_svg(data, symbology, &options)
            }
        };
        Ok(Artifact::Svg(svg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Color;
    use pretty_assertions::assert_eq;

    fn render(data: &str, symbology: &str, options: &RenderOptions) -> String {
        let artifact = SvgRenderer::new().render(data, symbology, options).unwrap();
        artifact.as_text().unwrap().to_string()
    }

    #[test]
    fn test_genuine_linear_symbol() {
        let svg = render("12345678", "code128", &RenderOptions::new());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(!svg.contains("data-placeholder"));
        assert!(svg.contains("<rect x=\"10\" y=\"10\" width=\"4\" height=\"100\"/>"));
        assert!(svg.contains(">12345678</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_qr_uses_path() {
        let svg = render("hello", "qrcode", &RenderOptions::new());
        assert!(svg.contains("<path d=\"M10,10h2v2h-2z"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn test_placeholder_linear() {
        let options = RenderOptions::new().resolve(&ResolvedOptions::default());
        let svg = placeholder_svg("AB", "code93", &options);
        assert!(svg.contains("width=\"300\" height=\"130\""));
        // 'A' -> 1 bar, 'B' -> 2 bars
        assert_eq!(svg.matches("width=\"2\" height=\"100\"").count(), 3);
        assert!(svg.contains("<rect x=\"14\" y=\"0\""));
        assert!(svg.contains("text-anchor=\"middle\""));
    }

    #[test]
    fn test_placeholder_2d_without_text() {
        let options = RenderOptions::new()
            .display_value(false)
            .resolve(&ResolvedOptions::default());
        let svg = placeholder_svg("data", "datamatrix", &options);
        assert!(svg.contains("width=\"300\" height=\"100\""));
        assert!(svg.contains("<rect x=\"110\" y=\"10\" width=\"80\" height=\"80\""));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn test_unsupported_generator_format_falls_back() {
        let svg = render("HELLO", "code93", &RenderOptions::new().background(Color::rgb(255, 0, 0)));
        assert!(svg.contains("data-placeholder=\"true\""));
        assert!(svg.contains("fill=\"#ff0000\""));
    }

    #[test]
    fn test_oversized_options_are_render_errors() {
        let renderer = SvgRenderer::new();
        let err = renderer
            .render("HELLO", "code128", &RenderOptions::new().height(u32::MAX))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Render { backend: "svg", .. }));
        // the placeholder path checks the same limits
        assert!(renderer
            .render("HELLO", "code93", &RenderOptions::new().margin(u32::MAX))
            .is_err());
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = render("A<B", "code128", &RenderOptions::new());
        assert!(svg.contains(">A&lt;B</text>"));
    }
}
