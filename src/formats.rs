//! Output format registry.

use std::fmt;
use std::str::FromStr;

/// Output formats the renderer set can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    /// Raster image
    Png,
    /// Vector image
    Svg,
    /// Hypertext markup fragment
    Html,
    /// Paginated document
    Pdf,
}

struct FormatInfo {
    format: OutputFormat,
    id: &'static str,
    mime: &'static str,
    extension: &'static str,
    description: &'static str,
}

static FORMATS: [FormatInfo; 4] = [
    FormatInfo {
        format: OutputFormat::Png,
        id: "png",
        mime: "image/png",
        extension: ".png",
        description: "PNG raster image",
    },
    FormatInfo {
        format: OutputFormat::Svg,
        id: "svg",
        mime: "image/svg+xml",
        extension: ".svg",
        description: "Scalable vector graphics",
    },
    FormatInfo {
        format: OutputFormat::Html,
        id: "html",
        mime: "text/html",
        extension: ".html",
        description: "HTML fragment with inline styles",
    },
    FormatInfo {
        format: OutputFormat::Pdf,
        id: "pdf",
        mime: "application/pdf",
        extension: ".pdf",
        description: "Single page PDF document",
    },
];

impl OutputFormat {
    /// All formats in registry order.
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Png,
        OutputFormat::Svg,
        OutputFormat::Html,
        OutputFormat::Pdf,
    ];

    fn info(self) -> &'static FormatInfo {
        // FORMATS is indexed in declaration order
        &FORMATS[self as usize]
    }

    /// Registry identifier (`png`, `svg`, ...)
    pub fn as_str(self) -> &'static str {
        self.info().id
    }

    /// MIME type of artifacts in this format
    pub fn mime_type(self) -> &'static str {
        self.info().mime
    }

    /// File extension including the leading dot
    pub fn extension(self) -> &'static str {
        self.info().extension
    }

    /// Human readable description
    pub fn description(self) -> &'static str {
        self.info().description
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FORMATS
            .iter()
            .find(|info| info.id.eq_ignore_ascii_case(s))
            .map(|info| info.format)
            .ok_or_else(|| format!("unknown format '{s}'"))
    }
}

/// Every registered format identifier.
pub fn list_all() -> Vec<&'static str> {
    FORMATS.iter().map(|info| info.id).collect()
}

/// Returns `true` if `format` is registered.
pub fn is_valid(format: &str) -> bool {
    format.parse::<OutputFormat>().is_ok()
}

/// MIME type for `format`, `application/octet-stream` when unknown.
pub fn mime_type_for(format: &str) -> &'static str {
    format
        .parse::<OutputFormat>()
        .map(OutputFormat::mime_type)
        .unwrap_or("application/octet-stream")
}

/// File extension for `format`, empty when unknown.
pub fn extension_for(format: &str) -> &'static str {
    format
        .parse::<OutputFormat>()
        .map(OutputFormat::extension)
        .unwrap_or("")
}

/// Description for `format`.
pub fn description_for(format: &str) -> &'static str {
    format
        .parse::<OutputFormat>()
        .map(OutputFormat::description)
        .unwrap_or("Unknown format")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_enum() {
        for format in OutputFormat::ALL {
            assert_eq!(format.info().format, format);
            assert_eq!(format.as_str().parse::<OutputFormat>(), Ok(format));
        }
    }

    #[test]
    fn test_lookups() {
        assert_eq!(list_all(), vec!["png", "svg", "html", "pdf"]);
        assert!(is_valid("svg"));
        assert!(is_valid("PDF"));
        assert!(!is_valid("gif"));
        assert_eq!(mime_type_for("png"), "image/png");
        assert_eq!(extension_for("html"), ".html");
    }

    #[test]
    fn test_unknown_format_fallbacks() {
        assert_eq!(mime_type_for("gif"), "application/octet-stream");
        assert_eq!(extension_for("gif"), "");
        assert_eq!(description_for("gif"), "Unknown format");
    }
}
