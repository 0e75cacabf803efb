use std::fmt::Write as _;

use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use super::{backend_constructors, symbol_text, Artifact, Backend, Layout, Renderer};
use crate::formats::OutputFormat;
use crate::options::{Color, RenderOptions, ResolvedOptions};
use crate::symbol::{placeholder, Symbol};
use crate::types;
use crate::{Error, Result};

const NAME: &str = "pdf";

/// US Letter in points.
const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;

/// Advance of one Courier glyph, in em.
const COURIER_ADVANCE: f32 = 0.6;

/// Document backend producing a single page PDF.
///
/// The symbol is drawn in points from the top-left corner of a US Letter page,
/// using the same layout as the raster backend. Text uses the built-in Courier
/// font.
#[derive(Clone, Default)]
pub struct PdfRenderer {
    backend: Backend,
}

backend_constructors!(PdfRenderer);

/// Page content stream in top-down coordinates.
struct Page {
    ops: String,
}

impl Page {
    fn new() -> Self {
        Self { ops: String::new() }
    }

    fn fill_color(&mut self, color: Color) {
        let [r, g, b] = color.to_unit();
        let _ = writeln!(self.ops, "{r:.3} {g:.3} {b:.3} rg");
    }

    fn rect(&mut self, x: u32, top: u32, w: u32, h: u32) {
        let y = i64::from(PAGE_HEIGHT) - i64::from(top) - i64::from(h);
        let _ = writeln!(self.ops, "{x} {y} {w} {h} re f");
    }

    fn text(&mut self, text: &str, x: f32, top: u32, size: u32) {
        let baseline = i64::from(PAGE_HEIGHT) - i64::from(top) - i64::from(size);
        let _ = writeln!(
            self.ops,
            "BT /F1 {size} Tf {x:.2} {baseline} Td ({}) Tj ET",
            escape_literal(text)
        );
    }
}

/// Escapes a PDF literal string. Non-ASCII characters become `?`, the
/// built-in font has no glyphs for them.
fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn courier_width(text: &str, size: u32) -> f32 {
    text.chars().count() as f32 * size as f32 * COURIER_ADVANCE
}

fn draw_symbol(page: &mut Page, symbol: &Symbol, options: &ResolvedOptions) -> Result<()> {
    let layout = Layout::new(symbol, options).map_err(|e| Error::render(NAME, e))?;
    page.fill_color(options.line_color);

    match symbol {
        Symbol::Linear(linear) => {
            for (start, len) in linear.bars() {
                page.rect(
                    layout.x + start as u32 * layout.unit,
                    layout.y,
                    len as u32 * layout.unit,
                    layout.symbol_height,
                );
            }
        }
        Symbol::Matrix(matrix) => {
            for my in 0..matrix.size {
                for mx in 0..matrix.size {
                    if matrix.get(mx, my) {
                        page.rect(
                            layout.x + mx as u32 * layout.unit,
                            layout.y + my as u32 * layout.unit,
                            layout.unit,
                            layout.unit,
                        );
                    }
                }
            }
        }
    }

    if let Some(top) = layout.text_top {
        let text = symbol_text(symbol);
        let x = options.text_align.place(
            layout.x as f32,
            layout.symbol_width as f32,
            courier_width(text, options.font_size),
        );
        page.text(text, x, top, options.font_size);
    }
    Ok(())
}

/// Placeholder drawing: a 25x25 cell grid for 2D types, `code % 5 + 1` bars per
/// character for linear ones.
fn draw_placeholder(page: &mut Page, data: &str, symbology: &str, options: &ResolvedOptions) {
    let unit = options.width;
    let (left, top) = (options.margin_left, options.margin_top);
    page.fill_color(options.line_color);

    let (span, bottom) = if types::is_two_dimensional(symbology) {
        let cells = placeholder::PDF_GRID;
        let cell = unit * 4;
        let codes = placeholder::char_codes(data);
        for row in 0..cells {
            for col in 0..cells {
                if placeholder::pdf_cell(&codes, row, col, cells) {
                    page.rect(left + col as u32 * cell, top + row as u32 * cell, cell, cell);
                }
            }
        }
        (cells as u32 * cell, top + cells as u32 * cell)
    } else {
        let mut x = left;
        for count in placeholder::bar_counts(data) {
            for _ in 0..count {
                page.rect(x, top, unit, options.height);
                x = x.saturating_add(unit * 2);
            }
        }
        (x - left, top + options.height)
    };

    if options.display_value {
        let x = options
            .text_align
            .place(left as f32, span as f32, courier_width(data, options.font_size));
        page.text(data, x, bottom + options.text_margin, options.font_size);
    }
}

fn build_document(content: Vec<u8>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    };
    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(i64::from(PAGE_WIDTH)),
        Object::Integer(i64::from(PAGE_HEIGHT)),
    ];
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => media_box,
        "Contents" => Object::Reference(content_id),
        "Resources" => resources,
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    });
    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| Error::render(NAME, e))?;
    page.set("Parent", Object::Reference(pages_id));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(|e| Error::render(NAME, e))?;
    Ok(buf)
}

impl Renderer for PdfRenderer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn render(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        let options = self.backend.resolve(NAME, options)?;

        let mut page = Page::new();
        page.fill_color(options.background);
        page.rect(0, 0, PAGE_WIDTH, PAGE_HEIGHT);

        match self.backend.symbol(data, symbology, &options) {
            Ok(symbol) => draw_symbol(&mut page, &symbol, &options)?,
            Err(err) => {
                debug!(symbology, error = %err, "pdf falling back to placeholder drawing");
                draw_placeholder(&mut page, data, symbology, &options);
            }
        }

        Ok(Artifact::Pdf(build_document(page.ops.into_bytes())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_render_pdf() {
        let artifact = PdfRenderer::new()
            .render("HELLO", "code128", &RenderOptions::new())
            .unwrap();
        let bytes = artifact.as_bytes();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert!(contains(bytes, "/Courier"));
        assert!(contains(bytes, "(HELLO) Tj"));
        assert!(contains(bytes, "%%EOF"));
        assert_eq!(artifact.mime_type(), "application/pdf");
    }

    #[test]
    fn test_background_and_first_bar() {
        let artifact = PdfRenderer::new()
            .render("HELLO", "code128", &RenderOptions::new().display_value(false))
            .unwrap();
        let bytes = artifact.as_bytes();
        assert!(contains(bytes, "1.000 1.000 1.000 rg\n0 0 612 792 re f"));
        // start B begins with a 2 module bar at the margin
        assert!(contains(bytes, "10 682 4 100 re f"));
        assert!(!contains(bytes, "BT /F1"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = PdfRenderer::new();
        let a = renderer.render("590123412345", "ean13", &RenderOptions::new()).unwrap();
        let b = renderer.render("590123412345", "ean13", &RenderOptions::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_placeholder_grid() {
        let mut page = Page::new();
        let options = RenderOptions::new()
            .display_value(false)
            .resolve(&ResolvedOptions::default());
        draw_placeholder(&mut page, "B", "pdf417", &options);
        // (66 + row + col) even: 313 of 625 cells
        assert_eq!(page.ops.matches(" re f").count(), 313);
    }

    #[test]
    fn test_placeholder_bars_with_text() {
        let mut page = Page::new();
        let options = ResolvedOptions::default();
        draw_placeholder(&mut page, "AB", "code93", &options);
        assert_eq!(page.ops.matches(" re f").count(), 3);
        assert!(page.ops.contains("(AB) Tj"));
    }

    #[test]
    fn test_oversized_options_are_render_errors() {
        let err = PdfRenderer::new()
            .render("HELLO", "code128", &RenderOptions::new().margin(u32::MAX))
            .unwrap_err();
        assert!(matches!(err, Error::Render { backend: "pdf", .. }));
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal(r"a(b)\c"), r"a\(b\)\\c");
        assert_eq!(escape_literal("é"), "?");
    }
}
