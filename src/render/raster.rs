use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use super::{backend_constructors, symbol_text, Artifact, Backend, Layout, Renderer};
use crate::font;
use crate::formats::OutputFormat;
use crate::options::{RenderOptions, ResolvedOptions};
use crate::symbol::Symbol;
use crate::{Error, Result};

const NAME: &str = "png";

/// Raster backend producing PNG images.
///
/// The surface is sized to the symbol: modules times `width`, plus margins,
/// plus the text block when `displayValue` is set.
#[derive(Clone, Default)]
pub struct PngRenderer {
    backend: Backend,
}

backend_constructors!(PngRenderer);

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

/// Paints `symbol` onto a fresh surface.
pub(crate) fn draw(symbol: &Symbol, options: &ResolvedOptions) -> Result<RgbaImage> {
    let layout = Layout::new(symbol, options).map_err(|e| Error::render(NAME, e))?;
    let mut img = RgbaImage::from_pixel(layout.width, layout.height, options.background.to_rgba());
    let ink = options.line_color.to_rgba();

    match symbol {
        Symbol::Linear(linear) => {
            for (start, len) in linear.bars() {
                let x = layout.x + start as u32 * layout.unit;
                fill_rect(&mut img, x, layout.y, len as u32 * layout.unit, layout.symbol_height, ink);
            }
        }
        Symbol::Matrix(matrix) => {
            for my in 0..matrix.size {
                for mx in 0..matrix.size {
                    if matrix.get(mx, my) {
                        let x = layout.x + mx as u32 * layout.unit;
                        let y = layout.y + my as u32 * layout.unit;
                        fill_rect(&mut img, x, y, layout.unit, layout.unit, ink);
                    }
                }
            }
        }
    }

    if let Some(top) = layout.text_top {
        let text = symbol_text(symbol);
        let scale = font::scale_for(options.font_size);
        let text_width = font::text_width(text, scale) as f32;
        let left = options
            .text_align
            .place(layout.x as f32, layout.symbol_width as f32, text_width);
        font::draw_text(&mut img, text, left.round() as i64, i64::from(top), scale, ink);
    }

    Ok(img)
}

pub(crate) fn encode_png(img: RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

impl Renderer for PngRenderer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn render(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        let options = self.backend.resolve(NAME, options)?;
        let symbol = self
            .backend
            .symbol(data, symbology, &options)
            .map_err(|e| Error::render(NAME, e))?;
        let png = encode_png(draw(&symbol, &options)?).map_err(|e| Error::render(NAME, e))?;
        Ok(Artifact::Png(png))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Color;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn test_render_png() {
        let artifact = PngRenderer::new()
            .render("HELLO123", "code128", &RenderOptions::new())
            .unwrap();
        assert!(artifact.as_bytes().starts_with(PNG_MAGIC));
        assert_eq!(artifact.mime_type(), "image/png");
    }

    #[test]
    fn test_surface_matches_layout() {
        let options = RenderOptions::new()
            .margin(0)
            .display_value(false)
            .width(1)
            .height(5)
            .resolve(&ResolvedOptions::default());
        let symbol = crate::symbol::Symbol::Linear(crate::symbol::LinearSymbol {
            modules: vec![true, false, true, true],
            text: "x".into(),
        });
        let img = draw(&symbol, &options).unwrap();
        assert_eq!(img.dimensions(), (4, 5));
        assert_eq!(img.get_pixel(0, 0), &Color::BLACK.to_rgba());
        assert_eq!(img.get_pixel(1, 4), &Color::WHITE.to_rgba());
        assert_eq!(img.get_pixel(3, 2), &Color::BLACK.to_rgba());
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = PngRenderer::new();
        let options = RenderOptions::new().line_color(Color::rgb(0, 0, 128));
        let a = renderer.render("590123412345", "ean13", &options).unwrap();
        let b = renderer.render("590123412345", "ean13", &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generator_failure_is_render_error() {
        let err = PngRenderer::new().render("hello", "datamatrix", &RenderOptions::new()).unwrap_err();
        assert!(matches!(err, Error::Render { backend: "png", .. }));
    }

    #[test]
    fn test_oversized_options_are_render_errors() {
        let renderer = PngRenderer::new();
        let err = renderer
            .render("HELLO", "code128", &RenderOptions::new().margin(u32::MAX))
            .unwrap_err();
        assert!(matches!(err, Error::Render { backend: "png", .. }));

        // within the option limits but too wide a surface
        let err = renderer
            .render("HELLO", "code128", &RenderOptions::new().width(10_000))
            .unwrap_err();
        assert!(err.to_string().contains("surface exceeds"));
    }

    #[test]
    fn test_qr_has_no_text_block() {
        let options = RenderOptions::new().resolve(&ResolvedOptions::default());
        let qr = crate::qrcode::QrCode::encode_text("hi", crate::qrcode::QrCodeEcc::Low).unwrap();
        let symbol = Symbol::Matrix(crate::symbol::MatrixSymbol::from(&qr));
        let img = draw(&symbol, &options).unwrap();
        assert_eq!(img.dimensions(), (21 * 2 + 20, 21 * 2 + 20));
    }
}
