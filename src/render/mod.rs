//! Renderer backends.
//!
//! A [`Renderer`] turns `(data, symbology, options)` into an [`Artifact`]. All
//! backends share the same steps: resolve the caller's options over their own
//! defaults, map the symbology to a [`SymbolFormat`], ask the
//! [`SymbolGenerator`] for a [`Symbol`] and draw it. Generation and drawing
//! failures come back as [`crate::Error::Render`] tagged with the backend name.

mod html;
mod pdf;
mod raster;
mod svg;

use std::fmt;
use std::sync::Arc;

use crate::formats::OutputFormat;
use crate::options::{RenderOptions, ResolvedOptions, TextPosition};
use crate::symbol::{symbol_format_for, BuiltinGenerator, Symbol, SymbolError, SymbolFormat, SymbolGenerator};
use crate::Result;

pub use html::HtmlRenderer;
pub use pdf::PdfRenderer;
pub use raster::PngRenderer;
pub use svg::SvgRenderer;

/// Output of a renderer.
#[derive(Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Encoded PNG image
    Png(Vec<u8>),
    /// SVG document
    Svg(String),
    /// HTML fragment
    Html(String),
    /// PDF document
    Pdf(Vec<u8>),
}

impl Artifact {
    /// Format of this artifact.
    pub fn format(&self) -> OutputFormat {
        match self {
            Artifact::Png(_) => OutputFormat::Png,
            Artifact::Svg(_) => OutputFormat::Svg,
            Artifact::Html(_) => OutputFormat::Html,
            Artifact::Pdf(_) => OutputFormat::Pdf,
        }
    }

    /// MIME type of the payload.
    pub fn mime_type(&self) -> &'static str {
        self.format().mime_type()
    }

    /// Raw payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Artifact::Png(bytes) | Artifact::Pdf(bytes) => bytes,
            Artifact::Svg(text) | Artifact::Html(text) => text.as_bytes(),
        }
    }

    /// Text payload of markup artifacts, `None` for binary ones.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Svg(text) | Artifact::Html(text) => Some(text),
            Artifact::Png(_) | Artifact::Pdf(_) => None,
        }
    }

    /// Consumes the artifact and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Artifact::Png(bytes) | Artifact::Pdf(bytes) => bytes,
            Artifact::Svg(text) | Artifact::Html(text) => text.into_bytes(),
        }
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("format", &self.format())
            .field("len", &self.as_bytes().len())
            .finish()
    }
}

/// A backend producing one output format.
pub trait Renderer: Send + Sync {
    /// Backend name used in render errors (`png`, `svg`, ...).
    fn name(&self) -> &'static str;

    /// Format of the artifacts this backend produces.
    fn format(&self) -> OutputFormat;

    /// Renders `data` as `symbology`.
    ///
    /// `options` are resolved over the backend defaults; unknown keys are
    /// passed through to the symbol generator.
    fn render(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact>;
}

/// State every backend carries: its defaults and its symbol generator.
#[derive(Clone)]
pub(crate) struct Backend {
    pub(crate) defaults: ResolvedOptions,
    pub(crate) generator: Arc<dyn SymbolGenerator>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            defaults: ResolvedOptions::default(),
            generator: Arc::new(BuiltinGenerator),
        }
    }
}

impl Backend {
    /// Resolves `options` over the defaults, rejecting oversized lengths as a
    /// render failure of `backend`.
    pub(crate) fn resolve(&self, backend: &'static str, options: &RenderOptions) -> Result<ResolvedOptions> {
        let resolved = options.resolve(&self.defaults);
        resolved.check_limits().map_err(|e| crate::Error::render(backend, e))?;
        Ok(resolved)
    }

    pub(crate) fn symbol(&self, data: &str, symbology: &str, options: &ResolvedOptions) -> std::result::Result<Symbol, SymbolError> {
        let format: SymbolFormat = symbol_format_for(symbology);
        self.generator.generate(data, format, options)
    }
}

/// Implements the constructors every backend shares.
macro_rules! backend_constructors {
    ($ty:ident) => {
        impl $ty {
            /// Backend with the library defaults and the built-in generator.
            pub fn new() -> Self {
                Self::default()
            }

            /// Backend resolving caller options over `defaults`.
            pub fn with_defaults(defaults: crate::options::ResolvedOptions) -> Self {
                let mut renderer = Self::default();
                renderer.backend.defaults = defaults;
                renderer
            }

            /// Replaces the symbol generator.
            pub fn with_generator(mut self, generator: std::sync::Arc<dyn crate::symbol::SymbolGenerator>) -> Self {
                self.backend.generator = generator;
                self
            }
        }
    };
}
pub(crate) use backend_constructors;

/// Where a genuine symbol and its text go on the output surface. All values
/// are in output units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Left edge of the symbol
    pub(crate) x: u32,
    /// Top edge of the symbol
    pub(crate) y: u32,
    /// Width of one module
    pub(crate) unit: u32,
    pub(crate) symbol_width: u32,
    pub(crate) symbol_height: u32,
    /// Top edge of the text block, when text is drawn
    pub(crate) text_top: Option<u32>,
}

/// Largest surface side a backend lays out, in output units.
pub(crate) const MAX_SURFACE: u32 = 32_768;

impl Layout {
    /// Lays out `symbol`. Text is only drawn for linear symbols.
    ///
    /// Fails when any edge overflows or exceeds [`MAX_SURFACE`].
    pub(crate) fn new(symbol: &Symbol, options: &ResolvedOptions) -> std::result::Result<Self, String> {
        let too_large = || format!("surface exceeds {MAX_SURFACE} units per side");
        let unit = options.width;
        let (symbol_width, symbol_height, has_text) = match symbol {
            Symbol::Linear(linear) => {
                let modules = u32::try_from(linear.modules.len()).map_err(|_| too_large())?;
                let w = modules.checked_mul(unit).ok_or_else(too_large)?;
                (w, options.height, options.display_value && !linear.text.is_empty())
            }
            Symbol::Matrix(matrix) => {
                let size = u32::try_from(matrix.size).map_err(|_| too_large())?;
                let side = size.checked_mul(unit).ok_or_else(too_large)?;
                (side, side, false)
            }
        };
        let text_block = if has_text { options.text_block_height() } else { 0 };

        let sum = |parts: &[u32]| {
            parts
                .iter()
                .try_fold(0u32, |acc, part| acc.checked_add(*part))
                .filter(|total| *total <= MAX_SURFACE)
                .ok_or_else(too_large)
        };
        let width = sum(&[options.margin_left, symbol_width, options.margin_right])?;
        let height = sum(&[options.margin_top, symbol_height, text_block, options.margin_bottom])?;

        // Every partial sum below is bounded by `height`.
        let (y, text_top) = match (has_text, options.text_position) {
            (false, _) => (options.margin_top, None),
            (true, TextPosition::Top) => (options.margin_top + text_block, Some(options.margin_top)),
            (true, TextPosition::Bottom) => (
                options.margin_top,
                Some(options.margin_top + symbol_height + options.text_margin),
            ),
        };

        Ok(Self {
            width,
            height,
            x: options.margin_left,
            y,
            unit,
            symbol_width,
            symbol_height,
            text_top,
        })
    }
}

/// Human readable text of a symbol.
pub(crate) fn symbol_text(symbol: &Symbol) -> &str {
    match symbol {
        Symbol::Linear(linear) => &linear.text,
        Symbol::Matrix(_) => "",
    }
}

/// Escapes text for use in XML/HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
