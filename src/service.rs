//! Barcode service: the public entry point tying validation to rendering.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::advanced::WatermarkPosition;
use crate::formats::{self, OutputFormat};
use crate::options::RenderOptions;
use crate::render::{Artifact, HtmlRenderer, PdfRenderer, PngRenderer, Renderer, SvgRenderer};
use crate::types;
use crate::validate::{self, ValidationResult};
use crate::{Error, Result};

/// One unit of work for [`BarcodeService::batch`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BatchItem {
    /// Payload to encode
    pub data: String,
    /// Symbology identifier
    #[serde(rename = "type")]
    pub symbology: String,
    /// Output format identifier
    #[serde(default = "default_format")]
    pub format: String,
    /// Render options
    #[serde(default)]
    pub options: RenderOptions,
}

fn default_format() -> String {
    OutputFormat::Png.as_str().to_string()
}

impl BatchItem {
    /// Item with default options.
    pub fn new(data: impl Into<String>, symbology: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            symbology: symbology.into(),
            format: format.into(),
            options: RenderOptions::default(),
        }
    }
}

/// Outcome of one batch item.
#[derive(Debug)]
pub struct BatchResult {
    /// Position of the item in the input
    pub index: usize,
    /// Rendered artifact or the failure
    pub outcome: Result<Artifact>,
    /// Payload of the item
    pub data: String,
    /// Symbology of the item
    pub symbology: String,
    /// Requested format
    pub format: String,
}

impl BatchResult {
    /// Whether the item rendered.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Rendered artifact, if any.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.outcome.as_ref().ok()
    }

    /// Failure, if any.
    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }

    /// JSON view: `{index, success, result | error, data, type, format}`.
    ///
    /// Markup results are inlined as text, binary results as base64.
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = json!({
            "index": self.index,
            "success": self.is_success(),
            "data": self.data,
            "type": self.symbology,
            "format": self.format,
        });
        match &self.outcome {
            Ok(artifact) => {
                let result = match artifact.as_text() {
                    Some(text) => text.to_string(),
                    None => STANDARD.encode(artifact.as_bytes()),
                };
                value["result"] = json!(result);
            }
            Err(err) => value["error"] = json!(err.to_string()),
        }
        value
    }
}

/// Validates requests and dispatches them to the renderer registered for
/// the requested format.
pub struct BarcodeService {
    renderers: BTreeMap<OutputFormat, Box<dyn Renderer>>,
}

impl Default for BarcodeService {
    fn default() -> Self {
        Self::new()
    }
}

impl BarcodeService {
    /// Service with the four built-in backends.
    pub fn new() -> Self {
        Self {
            renderers: BTreeMap::new(),
        }
        .with_renderer(Box::new(PngRenderer::new()))
        .with_renderer(Box::new(SvgRenderer::new()))
        .with_renderer(Box::new(HtmlRenderer::new()))
        .with_renderer(Box::new(PdfRenderer::new()))
    }

    /// Registers `renderer` for its format, replacing any previous one.
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderers.insert(renderer.format(), renderer);
        self
    }

    /// Validates and renders `data`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for empty data or an empty type
    /// - [`Error::UnsupportedType`] / [`Error::UnsupportedFormat`] for
    ///   identifiers missing from the registries
    /// - [`Error::Validation`] when the validator rejects the data
    /// - [`Error::Render`] when the backend fails
    pub fn generate(&self, data: &str, symbology: &str, format: &str, options: &RenderOptions) -> Result<Artifact> {
        if data.is_empty() {
            return Err(Error::InvalidInput("data must be a non-empty string".into()));
        }
        if symbology.is_empty() {
            return Err(Error::InvalidInput("barcode type must be a non-empty string".into()));
        }
        if !types::is_valid(symbology) {
            return Err(Error::UnsupportedType {
                symbology: symbology.to_string(),
                supported: types::list_all().join(", "),
            });
        }
        let unsupported_format = || Error::UnsupportedFormat {
            format: format.to_string(),
            supported: formats::list_all().join(", "),
        };
        let output: OutputFormat = format.parse().map_err(|_| unsupported_format())?;

        validate::validate(data, symbology).into_result()?;

        let renderer = self.renderers.get(&output).ok_or_else(unsupported_format)?;
        renderer.render(data, symbology, options)
    }

    /// Renders a PNG.
    pub fn png(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        self.generate(data, symbology, OutputFormat::Png.as_str(), options)
    }

    /// Renders an SVG document.
    pub fn svg(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        self.generate(data, symbology, OutputFormat::Svg.as_str(), options)
    }

    /// Renders an HTML fragment.
    pub fn html(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        self.generate(data, symbology, OutputFormat::Html.as_str(), options)
    }

    /// Renders a PDF document.
    pub fn pdf(&self, data: &str, symbology: &str, options: &RenderOptions) -> Result<Artifact> {
        self.generate(data, symbology, OutputFormat::Pdf.as_str(), options)
    }

    /// Runs the validator without rendering.
    pub fn validate(&self, data: &str, symbology: &str) -> ValidationResult {
        validate::validate(data, symbology)
    }

    /// Renders every item independently. Results keep the input order and a
    /// failing item never affects the others.
    pub fn batch(&self, items: &[BatchItem]) -> Vec<BatchResult> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let outcome = self.generate(&item.data, &item.symbology, &item.format, &item.options);
                if let Err(err) = &outcome {
                    debug!(index, symbology = %item.symbology, format = %item.format, error = %err, "batch item failed");
                }
                BatchResult {
                    index,
                    outcome,
                    data: item.data.clone(),
                    symbology: item.symbology.clone(),
                    format: item.format.clone(),
                }
            })
            .collect()
    }

    /// Registered symbology identifiers.
    pub fn barcode_types(&self) -> Vec<&'static str> {
        types::list_all()
    }

    /// Registered output formats.
    pub fn render_formats(&self) -> Vec<&'static str> {
        formats::list_all()
    }

    /// Anchor names accepted by the composition builder.
    pub fn watermark_positions(&self) -> Vec<&'static str> {
        WatermarkPosition::ALL.iter().map(|p| p.as_str()).collect()
    }

    /// Names of the registered backends, in format order.
    pub fn renderer_names(&self) -> Vec<&'static str> {
        self.renderers.values().map(|r| r.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFailure;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dispatch_by_format() {
        let service = BarcodeService::new();
        let options = RenderOptions::new();
        assert_eq!(service.png("1234567890", "code128", &options).unwrap().format(), OutputFormat::Png);
        assert_eq!(service.svg("1234567890", "code128", &options).unwrap().format(), OutputFormat::Svg);
        assert_eq!(service.html("1234567890", "code128", &options).unwrap().format(), OutputFormat::Html);
        assert_eq!(service.pdf("1234567890", "code128", &options).unwrap().format(), OutputFormat::Pdf);
    }

    #[test]
    fn test_unsupported_type_lists_valid_types() {
        let err = BarcodeService::new()
            .generate("123", "nope", "png", &RenderOptions::new())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("unsupported barcode type 'nope'. Supported types: code128, "));
        assert!(message.contains("qrcode"));
    }

    #[test]
    fn test_unsupported_format() {
        let err = BarcodeService::new()
            .generate("123", "code128", "gif", &RenderOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert!(err.to_string().ends_with("png, svg, html, pdf"));
    }

    #[test]
    fn test_validation_runs_before_rendering() {
        let err = BarcodeService::new()
            .png("1234567890120", "ean13", &RenderOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationFailure::Checksum { expected: 8, found: 0 })
        ));
    }

    #[test]
    fn test_empty_inputs() {
        let service = BarcodeService::new();
        assert!(matches!(
            service.png("", "code128", &RenderOptions::new()),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            service.png("123", "", &RenderOptions::new()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let items = vec![
            BatchItem::new("1234567890", "code128", "png"),
            BatchItem::new("", "code128", "png"),
        ];
        let results = BarcodeService::new().batch(&items);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 0);
        assert!(results[0].is_success());
        assert_eq!(results[1].index, 1);
        assert!(!results[1].is_success());
        assert!(results[1].error().is_some());
    }

    #[test]
    fn test_batch_item_from_json() {
        let items: Vec<BatchItem> = serde_json::from_str(
            r#"[{"data": "HELLO", "type": "code39", "format": "svg", "options": {"displayValue": false}},
                {"data": "12", "type": "itf"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].symbology, "code39");
        assert_eq!(items[0].options.display_value, Some(false));
        assert_eq!(items[1].format, "png");

        let results = BarcodeService::new().batch(&items);
        let json = results[0].to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["type"], "code39");
        assert!(json["result"].as_str().unwrap().starts_with("<svg"));
    }

    #[test]
    fn test_failed_batch_json_carries_error() {
        let results = BarcodeService::new().batch(&[BatchItem::new("x", "code128", "bmp")]);
        let json = results[0].to_json();
        assert_eq!(json["success"], false);
        assert!(json.get("result").is_none());
        assert!(json["error"].as_str().unwrap().contains("bmp"));
    }

    #[test]
    fn test_registries() {
        let service = BarcodeService::new();
        assert_eq!(service.render_formats(), vec!["png", "svg", "html", "pdf"]);
        assert_eq!(service.renderer_names(), vec!["png", "svg", "html", "pdf"]);
        assert!(service.barcode_types().contains(&"ean13"));
        let positions = service.watermark_positions();
        assert_eq!(positions.len(), 9);
        assert!(positions.contains(&"center"));
        assert!(positions.contains(&"top-left"));
        assert!(positions.contains(&"bottom-right"));
    }
}
