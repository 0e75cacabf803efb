//! Styled QR code composition.
//!
//! [`AdvancedQrBuilder`] collects the configuration through chained setters,
//! [`AdvancedQrBuilder::build`] freezes it into an [`AdvancedQr`], and the first
//! output call composes the image: background, QR code, logo, watermark, label.
//! The encoded buffer is cached, so later calls return the same bytes.
//!
//! Logo and watermark problems are logged and skipped; only a QR code that
//! cannot be generated fails the composition.
//!
//! # Example
//!
//! ```rust
//! use barforge::advanced::{AdvancedQrBuilder, WatermarkPosition};
//! use barforge::options::Color;
//! use barforge::qrcode::QrCodeEcc;
//!
//! let qr = AdvancedQrBuilder::new("https://example.com")
//!     .size(240)
//!     .error_correction_level(QrCodeEcc::High)
//!     .foreground_color(Color::rgb(20, 40, 120))
//!     .label("scan me")
//!     .watermark("DRAFT")
//!     .watermark_position(WatermarkPosition::TopRight)
//!     .build();
//!
//! let uri = qr.data_uri().unwrap();
//! assert!(uri.starts_with("data:image/png;base64,"));
//! ```

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::font;
use crate::helper::qr_to_image;
use crate::options::Color;
use crate::qrcode::QrCodeEcc;
use crate::{Error, Result};

/// Gap between a watermark and the surface edge.
const WATERMARK_PADDING: i64 = 10;
/// How far the logo backing square extends past the logo.
const LOGO_BACKING: u32 = 5;
/// Distance from the label baseline to the bottom edge.
const LABEL_BOTTOM: u32 = 10;

/// Largest output side length in pixels.
pub const MAX_SIZE: u32 = 8_192;

/// Anchor of the watermark on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum WatermarkPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl WatermarkPosition {
    /// Every anchor.
    pub const ALL: [WatermarkPosition; 9] = [
        WatermarkPosition::TopLeft,
        WatermarkPosition::TopCenter,
        WatermarkPosition::TopRight,
        WatermarkPosition::CenterLeft,
        WatermarkPosition::Center,
        WatermarkPosition::CenterRight,
        WatermarkPosition::BottomLeft,
        WatermarkPosition::BottomCenter,
        WatermarkPosition::BottomRight,
    ];

    /// Anchor name, e.g. `bottom-right`.
    pub fn as_str(self) -> &'static str {
        match self {
            WatermarkPosition::TopLeft => "top-left",
            WatermarkPosition::TopCenter => "top-center",
            WatermarkPosition::TopRight => "top-right",
            WatermarkPosition::CenterLeft => "center-left",
            WatermarkPosition::Center => "center",
            WatermarkPosition::CenterRight => "center-right",
            WatermarkPosition::BottomLeft => "bottom-left",
            WatermarkPosition::BottomCenter => "bottom-center",
            WatermarkPosition::BottomRight => "bottom-right",
        }
    }

    /// Parses an anchor name. Unknown names give [`WatermarkPosition::Center`].
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .unwrap_or(WatermarkPosition::Center)
    }

    /// Top-left corner of a `w` x `h` watermark on a square surface of side `size`.
    pub fn anchor(self, size: u32, w: u32, h: u32) -> (i64, i64) {
        let (s, w, h) = (i64::from(size), i64::from(w), i64::from(h));
        let pad = WATERMARK_PADDING;
        let left = pad;
        let center_x = (s - w) / 2;
        let right = s - w - pad;
        let top = pad;
        let center_y = (s - h) / 2;
        let bottom = s - h - pad;
        match self {
            WatermarkPosition::TopLeft => (left, top),
            WatermarkPosition::TopCenter => (center_x, top),
            WatermarkPosition::TopRight => (right, top),
            WatermarkPosition::CenterLeft => (left, center_y),
            WatermarkPosition::Center => (center_x, center_y),
            WatermarkPosition::CenterRight => (right, center_y),
            WatermarkPosition::BottomLeft => (left, bottom),
            WatermarkPosition::BottomCenter => (center_x, bottom),
            WatermarkPosition::BottomRight => (right, bottom),
        }
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding of the composed image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageOutputFormat {
    /// Lossless, keeps transparency
    #[default]
    Png,
    /// Lossy, flattened to RGB
    Jpeg,
}

impl ImageOutputFormat {
    /// MIME type of the encoded buffer.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageOutputFormat::Png => "image/png",
            ImageOutputFormat::Jpeg => "image/jpeg",
        }
    }

    fn encode(self, img: RgbaImage) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        match self {
            ImageOutputFormat::Png => DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png)?,
            ImageOutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
                DynamicImage::ImageRgb8(rgb).write_to(&mut buf, ImageFormat::Jpeg)?
            }
        }
        Ok(buf.into_inner())
    }
}

/// Everything the composition needs.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvancedQrConfig {
    /// Payload
    pub data: String,
    /// Side length of the output
    pub size: u32,
    /// Gap between the surface edge and the QR code
    pub margin: u32,
    /// QR error correction level
    pub error_correction_level: QrCodeEcc,
    /// Dark module and text color
    pub foreground_color: Color,
    /// Surface color
    pub background_color: Color,
    /// Image drawn over the center of the code
    pub logo_path: Option<PathBuf>,
    /// Logo edge as a percentage of `size`
    pub logo_size_percent: u32,
    /// Text drawn centered near the bottom edge
    pub label: Option<String>,
    /// Nominal size of label and text watermark
    pub label_font_size: u32,
    /// Watermark text, or an image path
    pub watermark: Option<String>,
    /// Where the watermark goes
    pub watermark_position: WatermarkPosition,
    /// Encoding of the result
    pub output_format: ImageOutputFormat,
}

impl Default for AdvancedQrConfig {
    fn default() -> Self {
        Self {
            data: String::new(),
            size: 300,
            margin: 10,
            error_correction_level: QrCodeEcc::Medium,
            foreground_color: Color::BLACK,
            background_color: Color::WHITE,
            logo_path: None,
            logo_size_percent: 20,
            label: None,
            label_font_size: 16,
            watermark: None,
            watermark_position: WatermarkPosition::BottomRight,
            output_format: ImageOutputFormat::Png,
        }
    }
}

/// Fluent builder for [`AdvancedQr`].
#[derive(Clone, Debug, Default)]
pub struct AdvancedQrBuilder {
    config: AdvancedQrConfig,
}

impl AdvancedQrBuilder {
    /// Starts a builder for `data` with default settings.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            config: AdvancedQrConfig {
                data: data.into(),
                ..AdvancedQrConfig::default()
            },
        }
    }

    /// Sets the payload.
    pub fn data(&mut self, data: impl Into<String>) -> &mut Self {
        self.config.data = data.into();
        self
    }

    /// Sets the output side length.
    pub fn size(&mut self, size: u32) -> &mut Self {
        self.config.size = size;
        self
    }

    /// Sets the margin around the code.
    pub fn margin(&mut self, margin: u32) -> &mut Self {
        self.config.margin = margin;
        self
    }

    /// Sets the error correction level.
    pub fn error_correction_level(&mut self, ecl: QrCodeEcc) -> &mut Self {
        self.config.error_correction_level = ecl;
        self
    }

    /// Sets the module and text color.
    pub fn foreground_color(&mut self, color: Color) -> &mut Self {
        self.config.foreground_color = color;
        self
    }

    /// Sets the surface color.
    pub fn background_color(&mut self, color: Color) -> &mut Self {
        self.config.background_color = color;
        self
    }

    /// Sets the logo image.
    pub fn logo(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.config.logo_path = Some(path.into());
        self
    }

    /// Sets the logo edge as a percentage of the output size.
    pub fn logo_size(&mut self, percent: u32) -> &mut Self {
        self.config.logo_size_percent = percent;
        self
    }

    /// Sets the label text.
    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.config.label = Some(label.into());
        self
    }

    /// Sets the label font size.
    pub fn label_font_size(&mut self, size: u32) -> &mut Self {
        self.config.label_font_size = size;
        self
    }

    /// Sets the watermark. Strings that look like a file path (a path
    /// separator and an extension dot) are loaded as images.
    pub fn watermark(&mut self, watermark: impl Into<String>) -> &mut Self {
        self.config.watermark = Some(watermark.into());
        self
    }

    /// Sets the watermark anchor.
    pub fn watermark_position(&mut self, position: WatermarkPosition) -> &mut Self {
        self.config.watermark_position = position;
        self
    }

    /// Sets the output encoding.
    pub fn output_format(&mut self, format: ImageOutputFormat) -> &mut Self {
        self.config.output_format = format;
        self
    }

    /// Freezes the current configuration.
    pub fn build(&self) -> AdvancedQr {
        AdvancedQr {
            config: self.config.clone(),
            cache: OnceCell::new(),
        }
    }
}

/// A frozen configuration plus its lazily composed output.
#[derive(Debug)]
pub struct AdvancedQr {
    config: AdvancedQrConfig,
    cache: OnceCell<Vec<u8>>,
}

fn looks_like_path(watermark: &str) -> bool {
    (watermark.contains('/') || watermark.contains('\\')) && watermark.contains('.')
}

fn load_square(path: &Path, edge: u32) -> Result<RgbaImage> {
    let img = image::open(path)?.to_rgba8();
    Ok(imageops::resize(&img, edge, edge, FilterType::Triangle))
}

fn fill_square(img: &mut RgbaImage, x: i64, y: i64, edge: u32, color: Color) {
    let patch = RgbaImage::from_pixel(edge, edge, color.to_rgba());
    imageops::overlay(img, &patch, x, y);
}

impl AdvancedQr {
    /// The frozen configuration.
    pub fn config(&self) -> &AdvancedQrConfig {
        &self.config
    }

    /// MIME type of the output.
    pub fn mime_type(&self) -> &'static str {
        self.config.output_format.mime_type()
    }

    /// Composes the image without encoding it.
    ///
    /// # Errors
    ///
    /// [`Error::Composition`] when the size exceeds [`MAX_SIZE`], the margin
    /// leaves no room or the data does not fit in a QR code.
    pub fn compose(&self) -> Result<RgbaImage> {
        let cfg = &self.config;
        let size = cfg.size;
        if size > MAX_SIZE {
            return Err(Error::Composition(format!(
                "size {size}px exceeds the limit of {MAX_SIZE}px"
            )));
        }
        let inner = size.saturating_sub(cfg.margin.saturating_mul(2));
        if inner == 0 {
            return Err(Error::Composition(format!(
                "margin {} leaves no room for the code on a {size}px surface",
                cfg.margin
            )));
        }

        let mut img = RgbaImage::from_pixel(size, size, cfg.background_color.to_rgba());
        let code = qr_to_image(
            &cfg.data,
            inner,
            cfg.error_correction_level,
            cfg.foreground_color,
            cfg.background_color,
        )
        .map_err(|e| Error::Composition(e.to_string()))?;
        imageops::overlay(&mut img, &code, i64::from(cfg.margin), i64::from(cfg.margin));

        if let Some(path) = &cfg.logo_path {
            if let Err(err) = self.draw_logo(&mut img, path) {
                warn!(path = %path.display(), error = %err, "logo skipped");
            }
        }

        if let Some(watermark) = &cfg.watermark {
            if let Err(err) = self.draw_watermark(&mut img, watermark) {
                warn!(watermark = %watermark, error = %err, "watermark skipped");
            }
        }

        if let Some(label) = &cfg.label {
            let scale = font::scale_for(cfg.label_font_size);
            let x = (i64::from(size) - i64::from(font::text_width(label, scale))) / 2;
            let y = i64::from(size) - i64::from(LABEL_BOTTOM) - i64::from(font::text_height(scale));
            font::draw_text(&mut img, label, x, y, scale, cfg.foreground_color.to_rgba());
        }

        Ok(img)
    }

    fn draw_logo(&self, img: &mut RgbaImage, path: &Path) -> Result<()> {
        let cfg = &self.config;
        let edge = cfg
            .size
            .checked_mul(cfg.logo_size_percent)
            .map(|scaled| scaled / 100)
            .filter(|edge| *edge <= cfg.size)
            .ok_or_else(|| {
                Error::Composition(format!("logo size {}% does not fit the surface", cfg.logo_size_percent))
            })?;
        if edge == 0 {
            return Ok(());
        }
        let logo = load_square(path, edge)?;
        let x = i64::from((cfg.size - edge.min(cfg.size)) / 2);
        let backing = i64::from(LOGO_BACKING);
        fill_square(img, x - backing, x - backing, edge + LOGO_BACKING * 2, cfg.background_color);
        imageops::overlay(img, &logo, x, x);
        Ok(())
    }

    fn draw_watermark(&self, img: &mut RgbaImage, watermark: &str) -> Result<()> {
        let cfg = &self.config;
        if looks_like_path(watermark) {
            let edge = (cfg.size / 4).max(1);
            let mark = load_square(Path::new(watermark), edge)?;
            let (x, y) = cfg.watermark_position.anchor(cfg.size, edge, edge);
            imageops::overlay(img, &mark, x, y);
        } else {
            let scale = font::scale_for(cfg.label_font_size);
            let (w, h) = (font::text_width(watermark, scale), font::text_height(scale));
            let (x, y) = cfg.watermark_position.anchor(cfg.size, w, h);
            font::draw_text(img, watermark, x, y, scale, cfg.foreground_color.to_rgba());
        }
        Ok(())
    }

    /// Encoded output, composed on first use and cached.
    pub fn generate(&self) -> Result<&[u8]> {
        let bytes = self
            .cache
            .get_or_try_init(|| self.config.output_format.encode(self.compose()?))?;
        Ok(bytes.as_slice())
    }

    /// Writes the encoded output to `path`.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.generate()?;
        std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
    }

    /// Base64 of the encoded output, without a MIME prefix.
    pub fn base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.generate()?))
    }

    /// `data:<mime>;base64,<payload>`.
    pub fn data_uri(&self) -> Result<String> {
        Ok(format!("data:{};base64,{}", self.mime_type(), self.base64()?))
    }
}
