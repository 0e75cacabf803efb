use image::{Rgba, RgbaImage};

use crate::options::Color;
use crate::qrcode::{QrCode, QrCodeEcc};
use crate::symbol::MatrixSymbol;
use crate::Result;

/*---- Utilities ----*/

/// Returns SVG path data covering every dark module of `matrix`.
///
/// Each module becomes one `M{x},{y}h{u}v{u}h-{u}z` square of side `unit`,
/// offset by `(x0, y0)`. Subpaths are separated by single spaces.
pub fn matrix_svg_path(matrix: &MatrixSymbol, x0: u32, y0: u32, unit: u32) -> String {
    let mut result = String::new();
    for y in 0..matrix.size {
        for x in 0..matrix.size {
            if matrix.get(x, y) {
                if !result.is_empty() {
                    result += " ";
                }
                let px = x0 + x as u32 * unit;
                let py = y0 + y as u32 * unit;
                result += &format!("M{px},{py}h{unit}v{unit}h-{unit}z");
            }
        }
    }
    result
}

/// Draws `matrix` into a `width` x `width` image without a quiet zone.
///
/// Pixels are mapped back to modules by nearest neighbour, so widths that are
/// not a multiple of the module count still produce the full symbol.
///
/// # Example
///
/// ```rust
/// use barforge::helper::matrix_to_image;
/// use barforge::options::Color;
/// use barforge::qrcode::{QrCode, QrCodeEcc};
/// use barforge::symbol::MatrixSymbol;
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// let img = matrix_to_image(&MatrixSymbol::from(&qr), 210, Color::BLACK, Color::WHITE);
/// assert_eq!(img.dimensions(), (210, 210));
/// ```
pub fn matrix_to_image(matrix: &MatrixSymbol, width: u32, dark: Color, light: Color) -> RgbaImage {
    let mut img = RgbaImage::new(width, width);
    if matrix.size == 0 {
        return img;
    }
    let size = matrix.size as u64;
    let (dark, light): (Rgba<u8>, Rgba<u8>) = (dark.to_rgba(), light.to_rgba());

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let mx = (u64::from(x) * size / u64::from(width)) as usize;
        let my = (u64::from(y) * size / u64::from(width)) as usize;
        *pixel = if matrix.get(mx, my) { dark } else { light };
    }

    img
}

/// Encodes `content` as a QR code and draws it `width` pixels wide.
///
/// # Errors
///
/// Returns [`crate::Error::Render`] when the content does not fit a QR code at
/// the requested error correction level.
pub fn qr_to_image(content: &str, width: u32, ecl: QrCodeEcc, dark: Color, light: Color) -> Result<RgbaImage> {
    let qr = QrCode::encode_text(content, ecl).map_err(|e| crate::Error::render("qrcode", e))?;
    Ok(matrix_to_image(&MatrixSymbol::from(&qr), width, dark, light))
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> MatrixSymbol {
        MatrixSymbol {
            size: 2,
            modules: vec![true, false, false, true],
        }
    }

    #[test]
    fn test_matrix_svg_path() {
        let path = matrix_svg_path(&checker(), 10, 20, 3);
        assert_eq!(path, "M10,20h3v3h-3z M13,23h3v3h-3z");
    }

    #[test]
    fn test_matrix_to_image_scales() {
        let img = matrix_to_image(&checker(), 4, Color::BLACK, Color::WHITE);
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(0, 0), &Color::BLACK.to_rgba());
        assert_eq!(img.get_pixel(1, 1), &Color::BLACK.to_rgba());
        assert_eq!(img.get_pixel(2, 0), &Color::WHITE.to_rgba());
        assert_eq!(img.get_pixel(3, 3), &Color::BLACK.to_rgba());
    }

    #[test]
    fn test_qr_to_image() {
        let img = qr_to_image("Hello, world!", 100, QrCodeEcc::Low, Color::BLACK, Color::WHITE).unwrap();
        assert_eq!(img.dimensions(), (100, 100));
        // top-left finder corner is dark
        assert_eq!(img.get_pixel(0, 0), &Color::BLACK.to_rgba());
    }
}
