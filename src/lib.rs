//! # barforge
//!
//! A Rust library for validating barcode data and rendering it as PNG, SVG,
//! HTML or PDF.
//!
//! `barforge` keeps a registry of 38 symbology identifiers (linear, EAN/UPC,
//! postal, specialized, 2D and stacked), validates payloads against their length,
//! charset and check digit rules, and renders them through four interchangeable
//! backends. A separate builder composes styled QR codes with logos, watermarks
//! and labels.
//!
//! ## Features
//!
//! - Validate data per symbology: length bounds, charsets, GS1 check digits.
//! - Encode Code 128, Code 39, EAN-13/8, UPC-A, ITF/ITF-14, MSI, Pharmacode,
//!   Codabar and QR Code (versions 1 to 40, four error correction levels).
//! - Render to PNG, SVG, HTML fragments or single page PDF documents with a
//!   shared option set (`width`, `height`, `displayValue`, colors, margins...).
//! - Batch rendering with per item failure isolation.
//! - Compose styled QR codes as PNG or JPEG, with logo, watermark and label.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! barforge = "0.1"
//! ```
//!
//! ## Example
//!
//! Render an EAN-13 as SVG:
//!
//! ```rust
//! use barforge::{BarcodeService, RenderOptions};
//!
//! let service = BarcodeService::new();
//! let svg = service
//!     .svg("590123412345", "ean13", &RenderOptions::new().height(60))
//!     .unwrap();
//! assert!(svg.as_text().unwrap().contains("5901234123457"));
//! ```
//!
//! Validate before rendering:
//!
//! ```rust
//! use barforge::validate::validate;
//!
//! assert!(validate("1234567890128", "ean13").valid);
//! assert!(!validate("1234567890120", "ean13").valid);
//! ```
//!
//! ## Modules
//!
//! - [`types`] and [`formats`]: symbology and output format registries.
//! - [`validate`]: payload validation and check digits.
//! - [`options`]: render options and colors.
//! - [`symbol`]: symbology encoders producing module patterns.
//! - [`qrcode`]: QR Code encoding.
//! - [`render`]: the PNG, SVG, HTML and PDF backends.
//! - [`service`]: validation plus dispatch, batch rendering.
//! - [`advanced`]: styled QR composition.
//! - [`helper`]: module matrix to image and SVG path conversion.

#![forbid(unsafe_code)]

pub mod advanced;
pub mod error;
pub mod font;
pub mod formats;
pub mod helper;
pub mod options;
pub mod qrcode;
pub mod render;
pub mod service;
pub mod symbol;
pub mod types;
pub mod validate;

pub use error::{Error, Result, ValidationFailure};
pub use options::{Color, RenderOptions, TextAlign, TextPosition};
pub use render::{Artifact, Renderer};
pub use service::{BarcodeService, BatchItem, BatchResult};
