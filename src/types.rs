//! Barcode type registry.
//!
//! A static table of every symbology barforge knows about, grouped by
//! [`Category`], with the length bounds and character set used by the
//! validator. The table never changes after startup; all lookups are pure
//! functions over it.

use std::fmt;

/// Grouping of symbologies, mirroring how they are usually presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// One-dimensional general purpose codes (Code 128, Code 39, ...)
    Linear,
    /// Retail EAN/UPC family
    EanUpc,
    /// Postal service codes
    Postal,
    /// Industry specific codes
    Specialized,
    /// Two-dimensional matrix codes
    Matrix2D,
    /// Stacked linear codes
    Stacked,
}

impl Category {
    /// All categories in presentation order.
    pub const ALL: [Category; 6] = [
        Category::Linear,
        Category::EanUpc,
        Category::Postal,
        Category::Specialized,
        Category::Matrix2D,
        Category::Stacked,
    ];

    /// Identifier used in listings (`linear`, `ean-upc`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Linear => "linear",
            Category::EanUpc => "ean-upc",
            Category::Postal => "postal",
            Category::Specialized => "specialized",
            Category::Matrix2D => "2d",
            Category::Stacked => "stacked",
        }
    }

    /// Parses a category identifier, accepting a few common spellings.
    pub fn parse(name: &str) -> Option<Category> {
        match name.to_ascii_lowercase().as_str() {
            "linear" | "1d" => Some(Category::Linear),
            "ean-upc" | "ean_upc" | "eanupc" | "ean/upc" => Some(Category::EanUpc),
            "postal" => Some(Category::Postal),
            "specialized" => Some(Category::Specialized),
            "2d" | "matrix" | "matrix2d" => Some(Category::Matrix2D),
            "stacked" => Some(Category::Stacked),
            _ => None,
        }
    }

    /// `true` for categories drawn as a grid of modules rather than a row of bars.
    pub fn is_two_dimensional(self) -> bool {
        matches!(self, Category::Matrix2D | Category::Stacked)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length and charset constraints for one symbology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbologyConfig {
    /// Minimum number of characters
    pub min_length: usize,
    /// Maximum number of characters
    pub max_length: usize,
    /// Human readable description of the accepted characters
    pub charset: &'static str,
}

/// Config returned for identifiers that are not registered.
pub const FALLBACK_CONFIG: SymbologyConfig = SymbologyConfig {
    min_length: 1,
    max_length: 100,
    charset: "Unknown",
};

/// One row of the registry.
#[derive(Clone, Copy, Debug)]
pub struct Symbology {
    /// Public identifier, e.g. `code128`
    pub id: &'static str,
    /// Category the symbology belongs to
    pub category: Category,
    /// Validation constraints
    pub config: SymbologyConfig,
    /// One line description
    pub description: &'static str,
}

const fn sym(
    id: &'static str,
    category: Category,
    min_length: usize,
    max_length: usize,
    charset: &'static str,
    description: &'static str,
) -> Symbology {
    Symbology {
        id,
        category,
        config: SymbologyConfig {
            min_length,
            max_length,
            charset,
        },
        description,
    }
}

use Category::*;

static SYMBOLOGIES: &[Symbology] = &[
    // Linear
    sym("code128", Linear, 1, 80, "ASCII", "Code 128 with automatic code set selection"),
    sym("code128a", Linear, 1, 80, "ASCII 0-95 (uppercase and control)", "Code 128 code set A"),
    sym("code128b", Linear, 1, 80, "ASCII 32-127", "Code 128 code set B"),
    sym("code128c", Linear, 2, 80, "Numeric (even length)", "Code 128 code set C, digit pairs"),
    sym("code39", Linear, 1, 43, "A-Z 0-9 - . $ / + % space", "Code 39, alphanumeric industrial code"),
    sym("code93", Linear, 1, 48, "A-Z 0-9 - . $ / + % space", "Code 93, compact Code 39 successor"),
    sym("code11", Linear, 1, 40, "0-9 -", "Code 11, telecom equipment labelling"),
    sym("itf", Linear, 2, 80, "Numeric (even length)", "Interleaved 2 of 5"),
    sym("itf14", Linear, 13, 14, "Numeric", "ITF-14 shipping container code"),
    sym("codabar", Linear, 1, 60, "0-9 - $ : / . + (A-D start/stop)", "Codabar, libraries and blood banks"),
    sym("msi", Linear, 1, 30, "Numeric", "MSI Plessey without check digit"),
    sym("msi10", Linear, 1, 30, "Numeric", "MSI Plessey with Mod 10 check digit"),
    sym("msi11", Linear, 1, 30, "Numeric", "MSI Plessey with Mod 11 check digit"),
    sym("msi1010", Linear, 1, 30, "Numeric", "MSI Plessey with double Mod 10 check digits"),
    sym("msi1110", Linear, 1, 30, "Numeric", "MSI Plessey with Mod 11 and Mod 10 check digits"),
    sym("pharmacode", Linear, 1, 6, "Numeric (3-131070)", "Pharmacode, pharmaceutical packaging"),
    // EAN/UPC
    sym("ean13", EanUpc, 12, 13, "Numeric", "EAN-13 retail product code"),
    sym("ean8", EanUpc, 7, 8, "Numeric", "EAN-8 retail code for small packages"),
    sym("ean5", EanUpc, 5, 5, "Numeric", "EAN-5 add-on, book prices"),
    sym("ean2", EanUpc, 2, 2, "Numeric", "EAN-2 add-on, periodical issues"),
    sym("upca", EanUpc, 11, 12, "Numeric", "UPC-A North American retail code"),
    sym("upce", EanUpc, 6, 8, "Numeric", "UPC-E zero suppressed UPC"),
    // Postal
    sym("postnet", Postal, 5, 11, "Numeric", "USPS POSTNET"),
    sym("planet", Postal, 11, 13, "Numeric", "USPS PLANET"),
    sym("onecode", Postal, 20, 31, "Numeric", "USPS Intelligent Mail barcode"),
    sym("royalmail", Postal, 1, 50, "A-Z 0-9", "Royal Mail 4-state customer code"),
    sym("kix", Postal, 1, 50, "A-Z 0-9", "Dutch KIX postal code"),
    // Specialized
    sym("gs1_128", Specialized, 1, 48, "GS1 application identifiers", "GS1-128 supply chain code"),
    sym("isbn", Specialized, 10, 13, "Numeric", "ISBN book number"),
    sym("issn", Specialized, 8, 13, "Numeric", "ISSN serial number"),
    sym("telepen", Specialized, 1, 30, "ASCII", "Telepen, UK libraries"),
    // 2D
    sym("qrcode", Matrix2D, 1, 2953, "Any", "QR Code"),
    sym("datamatrix", Matrix2D, 1, 2335, "Any", "Data Matrix ECC 200"),
    sym("aztec", Matrix2D, 1, 3067, "Any", "Aztec Code"),
    sym("maxicode", Matrix2D, 1, 93, "Any", "MaxiCode, parcel sorting"),
    // Stacked
    sym("pdf417", Stacked, 1, 1850, "Any", "PDF417 stacked code"),
    sym("micropdf417", Stacked, 1, 250, "Any", "MicroPDF417"),
    sym("codablockf", Stacked, 1, 2725, "ASCII", "Codablock-F stacked Code 128"),
];

fn find(id: &str) -> Option<&'static Symbology> {
    SYMBOLOGIES.iter().find(|s| s.id == id)
}

/// Every registered identifier, in registry order.
pub fn list_all() -> Vec<&'static str> {
    SYMBOLOGIES.iter().map(|s| s.id).collect()
}

/// Identifiers belonging to `category`.
pub fn list_by_category(category: Category) -> Vec<&'static str> {
    SYMBOLOGIES
        .iter()
        .filter(|s| s.category == category)
        .map(|s| s.id)
        .collect()
}

/// Like [`list_by_category`] but takes the textual category name.
/// Unknown names yield an empty list.
pub fn list_by_category_name(name: &str) -> Vec<&'static str> {
    Category::parse(name).map(list_by_category).unwrap_or_default()
}

/// Returns `true` if `id` is registered.
pub fn is_valid(id: &str) -> bool {
    find(id).is_some()
}

/// Full registry entry for `id`.
pub fn lookup(id: &str) -> Option<&'static Symbology> {
    find(id)
}

/// Category of `id`, if registered.
pub fn category_of(id: &str) -> Option<Category> {
    find(id).map(|s| s.category)
}

/// Returns `true` if `id` is a registered 2D or stacked symbology.
pub fn is_two_dimensional(id: &str) -> bool {
    category_of(id).is_some_and(Category::is_two_dimensional)
}

/// Validation constraints for `id`.
///
/// Unregistered identifiers get [`FALLBACK_CONFIG`] instead of an error so that
/// loosely specified types can still be rendered.
pub fn config_for(id: &str) -> SymbologyConfig {
    find(id).map(|s| s.config).unwrap_or(FALLBACK_CONFIG)
}

/// Description of `id`, or a generic text for unknown identifiers.
pub fn description_for(id: &str) -> &'static str {
    find(id).map(|s| s.description).unwrap_or("Unknown barcode type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_is_consistent() {
        let all = list_all();
        assert!(all.len() >= 32);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
        for id in all {
            assert!(is_valid(id));
            let config = config_for(id);
            assert!(config.min_length <= config.max_length, "{id}");
            assert!(config.min_length >= 1, "{id}");
        }
    }

    #[test]
    fn test_unknown_type_gets_fallback() {
        assert!(!is_valid("code42"));
        assert_eq!(config_for("code42"), FALLBACK_CONFIG);
        assert_eq!(config_for("code42").charset, "Unknown");
        assert_eq!(description_for("code42"), "Unknown barcode type");
    }

    #[test]
    fn test_list_by_category() {
        let ean = list_by_category(Category::EanUpc);
        assert!(ean.contains(&"ean13"));
        assert!(ean.contains(&"upca"));
        assert!(!ean.contains(&"code128"));

        let matrix = list_by_category_name("2d");
        assert!(matrix.contains(&"qrcode"));
        assert!(list_by_category_name("holographic").is_empty());
    }

    #[test]
    fn test_every_category_has_members() {
        let total: usize = Category::ALL.iter().map(|c| list_by_category(*c).len()).sum();
        assert_eq!(total, list_all().len());
        for category in Category::ALL {
            assert!(!list_by_category(category).is_empty(), "{category}");
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_two_dimensional_detection() {
        assert!(is_two_dimensional("qrcode"));
        assert!(is_two_dimensional("pdf417"));
        assert!(!is_two_dimensional("ean13"));
        assert!(!is_two_dimensional("nope"));
    }
}
