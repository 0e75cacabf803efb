use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::debug;

use super::{backend_constructors, escape_html, symbol_text, Artifact, Backend, Renderer};
use crate::formats::OutputFormat;
use crate::options::{ResolvedOptions, RenderOptions, TextPosition};
use crate::symbol::{placeholder, Symbol};
use crate::types;
use crate::Result;

const NAME: &str = "html";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Markup backend producing a self-contained HTML fragment.
///
/// Each fragment gets a container id of the form
/// `barcode-<unix millis>-<9 base36 chars>`. Pass the `id` option to pin it.
#[derive(Clone, Default)]
pub struct HtmlRenderer {
    backend: Backend,
}

backend_constructors!(HtmlRenderer);

/// Generates a fresh container id.
pub fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("barcode-{millis}-{suffix}")
}

/// Turns a caller supplied id into a valid CSS id selector: characters
/// outside `[A-Za-z0-9_-]` become `-` and a leading digit gets a `barcode-`
/// prefix. Returns `None` when nothing usable is left.
fn sanitize_id(raw: &str) -> Option<String> {
    let id: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    if id.trim_matches('-').is_empty() {
        return None;
    }
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        Some(format!("barcode-{id}"))
    } else {
        Some(id)
    }
}

/// What goes inside the symbol box.
enum Body {
    /// `(left, width)` bars, all spanning the full box height
    Bars(Vec<(u32, u32)>),
    /// Row-major fill states of a square grid
    Cells { side: usize, filled: Vec<bool> },
}

struct Fragment<'a> {
    id: String,
    body: Body,
    /// Width of the symbol box
    width: u32,
    /// Height of the symbol box
    height: u32,
    /// Size of one grid cell
    unit: u32,
    text: Option<&'a str>,
    placeholder: bool,
}

impl Fragment<'_> {
    fn write(&self, options: &ResolvedOptions) -> String {
        let id = &self.id;
        let mut out = String::new();
        let _ = write!(out, "<div id=\"{id}\" class=\"barcode-container\"");
        if self.placeholder {
            out.push_str(" data-placeholder=\"true\"");
        }
        let _ = writeln!(
            out,
            " style=\"display:inline-block;background:{};padding:{}px {}px {}px {}px;\">",
            options.background,
            options.margin_top,
            options.margin_right,
            options.margin_bottom,
            options.margin_left
        );

        let label = self
            .text
            .map(|text| format!("  <div class=\"barcode-text\">{}</div>\n", escape_html(text)));
        if let (Some(label), TextPosition::Top) = (&label, options.text_position) {
            out.push_str(label);
        }

        match &self.body {
            Body::Bars(bars) => {
                let _ = writeln!(out, "  <div class=\"barcode-bars\">");
                for (left, width) in bars {
                    let _ = writeln!(out, "    <div class=\"bar\" style=\"left:{left}px;width:{width}px;\"></div>");
                }
                out.push_str("  </div>\n");
            }
            Body::Cells { filled, .. } => {
                let _ = writeln!(out, "  <div class=\"barcode-grid\">");
                for &on in filled {
                    out.push_str(if on {
                        "    <div class=\"cell on\"></div>\n"
                    } else {
                        "    <div class=\"cell\"></div>\n"
                    });
                }
                out.push_str("  </div>\n");
            }
        }

        if let (Some(label), TextPosition::Bottom) = (&label, options.text_position) {
            out.push_str(label);
        }

        out.push_str("  <style>\n");
        let _ = writeln!(out, "    #{id} .barcode-bars {{ position:relative; width:{}px; height:{}px; }}", self.width, self.height);
        let _ = writeln!(
            out,
            "    #{id} .bar {{ position:absolute; top:0; height:100%; background:{}; }}",
            options.line_color
        );
        if let Body::Cells { side, .. } = &self.body {
            let _ = writeln!(
                out,
                "    #{id} .barcode-grid {{ display:grid; grid-template-columns:repeat({side}, {unit}px); grid-auto-rows:{unit}px; }}",
                unit = self.unit
            );
        }
        let _ = writeln!(out, "    #{id} .cell.on {{ background:{}; }}", options.line_color);
        let _ = writeln!(
            out,
            "    #{id} .barcode-text {{ font-family:monospace; font-size:{}px; text-align:{}; margin-top:{}px; color:{}; }}",
            options.font_size,
            options.text_align.as_css(),
            options.text_margin,
            options.line_color
        );
        out.push_str("  </style>\n</div>\n");
        out
    }
}

fn genuine_body(symbol: &Symbol, unit: u32, height: u32) -> (Body, u32, u32) {
    match symbol {
        Symbol::Linear(linear) => {
            let bars = linear
                .bars()
                .into_iter()
                .map(|(start, len)| ((start as u32).saturating_mul(unit), (len as u32).saturating_mul(unit)))
                .collect();
            (Body::Bars(bars), (linear.modules.len() as u32).saturating_mul(unit), height)
        }
        Symbol::Matrix(matrix) => {
            let side = (matrix.size as u32).saturating_mul(unit);
            let body = Body::Cells {
                side: matrix.size,
                filled: matrix.modules.clone(),
            };
            (body, side, side)
        }
    }
}

fn placeholder_body(data: &str, symbology: &str, unit: u32, height: u32) -> (Body, u32, u32) {
    if types::is_two_dimensional(symbology) {
        let codes = placeholder::char_codes(data);
        let side = placeholder::HTML_GRID;
        let filled = (0..side * side).map(|i| placeholder::html_cell(&codes, i)).collect();
        let cell = unit * 4;
        (Body::Cells { side, filled }, side as u32 * cell, side as u32 * cell)
    } else {
        let mut bars = Vec::new();
        let mut x: u32 = 0;
        for count in placeholder::bar_counts(data) {
            for _ in 0..count {
                bars.push((x, unit));
                x = x.saturating_add(unit * 2);
            }
        }
        (Body::Bars(bars), x, height)
    }
}

impl Renderer for HtmlRenderer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn render(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        let options = self.backend.resolve(NAME, options)?;
        let id = options
            .extra_str("id")
            .and_then(sanitize_id)
            .unwrap_or_else(generate_id);

        let symbol = self.backend.symbol(data, symbology, &options);
        let (body, width, height, text, is_placeholder) = match &symbol {
            Ok(symbol) => {
                let (body, w, h) = genuine_body(symbol, options.width, options.height);
                let text = Some(symbol_text(symbol)).filter(|t| !t.is_empty());
                (body, w, h, text, false)
            }
            Err(err) => {
                debug!(symbology, error = %err, "html falling back to placeholder drawing");
                let (body, w, h) = placeholder_body(data, symbology, options.width, options.height);
                (body, w, h, Some(data), true)
            }
        };

        let unit = match &body {
            Body::Cells { side, .. } if *side > 0 => width / *side as u32,
            _ => options.width,
        };
        let fragment = Fragment {
            id,
            body,
            width,
            height,
            unit,
            text: text.filter(|_| options.display_value),
            placeholder: is_placeholder,
        };
        Ok(Artifact::Html(fragment.write(&options)))
    }
}
