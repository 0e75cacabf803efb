//! Placeholder drawing for symbols the generator cannot produce.
//!
//! None of this encodes a real symbology. The bar count and cell rules only
//! give the vector, markup and document backends something deterministic to
//! draw when [`super::SymbolGenerator`] fails, so the output is visibly a
//! stand-in and never scannable.

/// Bars drawn per input character (1 to 5), one entry per UTF-16 code unit.
pub fn bar_counts(data: &str) -> Vec<usize> {
    data.encode_utf16().map(|code| usize::from(code % 5) + 1).collect()
}

/// Side length of the markup placeholder grid.
pub const HTML_GRID: usize = 21;

/// Side length of the document placeholder grid.
pub const PDF_GRID: usize = 25;

/// Fill state of cell `index` (row-major) in the markup grid:
/// `(code[index mod len] + index) mod 2 == 0`.
pub fn html_cell(codes: &[u16], index: usize) -> bool {
    match codes.len() {
        0 => false,
        len => (usize::from(codes[index % len]) + index) % 2 == 0,
    }
}

/// Fill state of a cell in the document grid:
/// `(code[(row * cells + col) mod len] + row + col) mod 2 == 0`.
pub fn pdf_cell(codes: &[u16], row: usize, col: usize, cells: usize) -> bool {
    match codes.len() {
        0 => false,
        len => (usize::from(codes[(row * cells + col) % len]) + row + col) % 2 == 0,
    }
}

/// UTF-16 code units of `data`, the input of the cell rules.
pub fn char_codes(data: &str) -> Vec<u16> {
    data.encode_utf16().collect()
}
