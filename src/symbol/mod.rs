//! Symbol generation.
//!
//! Renderers never encode anything themselves. They map the public symbology
//! identifier to a [`SymbolFormat`], ask a [`SymbolGenerator`] for a [`Symbol`]
//! (a row of bar modules or a grid of 2D modules) and draw that.
//!
//! [`BuiltinGenerator`] covers the Code 128 family, Code 39, EAN/UPC, ITF, MSI,
//! Pharmacode, Codabar and QR. Anything else reports
//! [`SymbolError::Unsupported`] and the backends decide whether to fall back to
//! the [`placeholder`] drawing.

mod linear;
pub mod placeholder;

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::options::ResolvedOptions;
use crate::qrcode::{DataTooLong, QrCode, QrCodeEcc};

pub use linear::Code128Set;

/// Identifiers understood by the symbol generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SymbolFormat {
    Code128,
    Code128A,
    Code128B,
    Code128C,
    Code39,
    Code93,
    Ean13,
    Ean8,
    Ean5,
    Ean2,
    Upc,
    UpcE,
    Itf,
    Itf14,
    Msi,
    Msi10,
    Msi11,
    Msi1010,
    Msi1110,
    Pharmacode,
    Codabar,
    QrCode,
    DataMatrix,
    Aztec,
    MaxiCode,
    Pdf417,
    MicroPdf417,
    CodablockF,
}

impl SymbolFormat {
    /// Generator side name, e.g. `CODE128`.
    pub fn name(self) -> &'static str {
        use SymbolFormat::*;
        match self {
            Code128 => "CODE128",
            Code128A => "CODE128A",
            Code128B => "CODE128B",
            Code128C => "CODE128C",
            Code39 => "CODE39",
            Code93 => "CODE93",
            Ean13 => "EAN13",
            Ean8 => "EAN8",
            Ean5 => "EAN5",
            Ean2 => "EAN2",
            Upc => "UPC",
            UpcE => "UPCE",
            Itf => "ITF",
            Itf14 => "ITF14",
            Msi => "MSI",
            Msi10 => "MSI10",
            Msi11 => "MSI11",
            Msi1010 => "MSI1010",
            Msi1110 => "MSI1110",
            Pharmacode => "PHARMACODE",
            Codabar => "CODABAR",
            QrCode => "QR",
            DataMatrix => "DATAMATRIX",
            Aztec => "AZTEC",
            MaxiCode => "MAXICODE",
            Pdf417 => "PDF417",
            MicroPdf417 => "MICROPDF417",
            CodablockF => "CODABLOCKF",
        }
    }

    /// `true` for formats whose symbols are module grids.
    pub fn is_matrix(self) -> bool {
        use SymbolFormat::*;
        matches!(
            self,
            QrCode | DataMatrix | Aztec | MaxiCode | Pdf417 | MicroPdf417 | CodablockF
        )
    }
}

impl fmt::Display for SymbolFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static FORMAT_MAPPING: &[(&str, SymbolFormat)] = &[
    ("code128", SymbolFormat::Code128),
    ("code128a", SymbolFormat::Code128A),
    ("code128b", SymbolFormat::Code128B),
    ("code128c", SymbolFormat::Code128C),
    ("gs1_128", SymbolFormat::Code128),
    ("code39", SymbolFormat::Code39),
    ("code93", SymbolFormat::Code93),
    ("ean13", SymbolFormat::Ean13),
    ("isbn", SymbolFormat::Ean13),
    ("issn", SymbolFormat::Ean13),
    ("ean8", SymbolFormat::Ean8),
    ("ean5", SymbolFormat::Ean5),
    ("ean2", SymbolFormat::Ean2),
    ("upca", SymbolFormat::Upc),
    ("upce", SymbolFormat::UpcE),
    ("itf", SymbolFormat::Itf),
    ("itf14", SymbolFormat::Itf14),
    ("msi", SymbolFormat::Msi),
    ("msi10", SymbolFormat::Msi10),
    ("msi11", SymbolFormat::Msi11),
    ("msi1010", SymbolFormat::Msi1010),
    ("msi1110", SymbolFormat::Msi1110),
    ("pharmacode", SymbolFormat::Pharmacode),
    ("codabar", SymbolFormat::Codabar),
    ("qrcode", SymbolFormat::QrCode),
    ("datamatrix", SymbolFormat::DataMatrix),
    ("aztec", SymbolFormat::Aztec),
    ("maxicode", SymbolFormat::MaxiCode),
    ("pdf417", SymbolFormat::Pdf417),
    ("micropdf417", SymbolFormat::MicroPdf417),
    ("codablockf", SymbolFormat::CodablockF),
];

/// Maps a public symbology identifier to the generator format.
///
/// Identifiers missing from the table fall back to [`SymbolFormat::Code128`].
/// The service validates types before rendering, so the fallback only matters
/// for direct renderer callers and registry entries without a dedicated encoder.
pub fn symbol_format_for(symbology: &str) -> SymbolFormat {
    match FORMAT_MAPPING.iter().find(|(id, _)| *id == symbology) {
        Some((_, format)) => *format,
        None => {
            debug!(symbology, "no generator mapping, using CODE128");
            SymbolFormat::Code128
        }
    }
}

/// One row of bar modules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearSymbol {
    /// Module colors from left to right, `true` is a bar
    pub modules: Vec<bool>,
    /// Human readable text (includes computed check digits)
    pub text: String,
}

impl LinearSymbol {
    /// Dark runs as `(first module, module count)`.
    pub fn bars(&self) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = None;
        for (i, &dark) in self.modules.iter().enumerate() {
            match (dark, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    runs.push((s, i - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, self.modules.len() - s));
        }
        runs
    }
}

/// A square grid of modules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixSymbol {
    /// Side length in modules
    pub size: usize,
    /// Row-major module colors, `true` is dark
    pub modules: Vec<bool>,
}

impl MatrixSymbol {
    /// Module at `(x, y)`; out of range is light.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }
}

impl From<&QrCode> for MatrixSymbol {
    fn from(qr: &QrCode) -> Self {
        let size = qr.size();
        let modules = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| qr.get_module(x, y))
            .collect();
        Self {
            size: size as usize,
            modules,
        }
    }
}

/// Renderable description of an encoded barcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// Bars
    Linear(LinearSymbol),
    /// 2D modules
    Matrix(MatrixSymbol),
}

/// Failures of the symbol generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// The generator has no encoder for this format
    #[error("{0} symbols are not supported by the generator")]
    Unsupported(SymbolFormat),

    /// The data cannot be encoded in this format
    #[error("cannot encode {format}: {reason}")]
    InvalidData {
        /// Target format
        format: SymbolFormat,
        /// What is wrong with the data
        reason: String,
    },

    /// The data exceeds QR capacity
    #[error("data too long: {0}")]
    DataTooLong(#[from] DataTooLong),
}

impl SymbolError {
    pub(crate) fn invalid(format: SymbolFormat, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            format,
            reason: reason.into(),
        }
    }
}

/// Turns data into a [`Symbol`].
pub trait SymbolGenerator: Send + Sync {
    /// Encodes `data` as `format`. Only options that change the encoding are
    /// read (for QR the pass-through `errorCorrectionLevel` key).
    fn generate(&self, data: &str, format: SymbolFormat, options: &ResolvedOptions) -> Result<Symbol, SymbolError>;
}

/// Encoders shipped with barforge.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinGenerator;

impl SymbolGenerator for BuiltinGenerator {
    fn generate(&self, data: &str, format: SymbolFormat, options: &ResolvedOptions) -> Result<Symbol, SymbolError> {
        use SymbolFormat::*;
        let linear = match format {
            Code128 => linear::code128(data, None)?,
            Code128A => linear::code128(data, Some(Code128Set::A))?,
            Code128B => linear::code128(data, Some(Code128Set::B))?,
            Code128C => linear::code128(data, Some(Code128Set::C))?,
            Code39 => linear::code39(data)?,
            Ean13 => linear::ean13(data)?,
            Ean8 => linear::ean8(data)?,
            Upc => linear::upca(data)?,
            Itf => linear::itf(data)?,
            Itf14 => linear::itf14(data)?,
            Msi => linear::msi(data, linear::MsiCheck::None)?,
            Msi10 => linear::msi(data, linear::MsiCheck::Mod10)?,
            Msi11 => linear::msi(data, linear::MsiCheck::Mod11)?,
            Msi1010 => linear::msi(data, linear::MsiCheck::Mod1010)?,
            Msi1110 => linear::msi(data, linear::MsiCheck::Mod1110)?,
            Pharmacode => linear::pharmacode(data)?,
            Codabar => linear::codabar(data)?,
            QrCode => {
                let ecl = options
                    .extra_str("errorCorrectionLevel")
                    .and_then(|level| level.parse::<QrCodeEcc>().ok())
                    .unwrap_or_default();
                let qr = crate::qrcode::QrCode::encode_text(data, ecl)?;
                return Ok(Symbol::Matrix(MatrixSymbol::from(&qr)));
            }
            Code93 | Ean5 | Ean2 | UpcE | DataMatrix | Aztec | MaxiCode | Pdf417 | MicroPdf417
            | CodablockF => return Err(SymbolError::Unsupported(format)),
        };
        Ok(Symbol::Linear(linear))
    }
}
