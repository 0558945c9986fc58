//! # Barcode Label Sheets
//!
//! ```text
//!  LabelSpec x copies ──► layout_sheets ──► SheetPage ──► render_page ──► SVG
//!                              │
//!                              └── code128::encode(sku)
//! ```
//!
//! Layout is independent of rendering: [`layout::TextMetrics`] supplies text
//! widths, so the same pages can be drawn by any backend.

pub mod code128;
pub mod layout;
pub mod svg;

pub use layout::{
    layout_sheets, ApproxMetrics, LabelSpec, PlacedLabel, SheetGeometry, SheetPage, TextMetrics,
};
pub use svg::render_page;

/// Archive entry name for a 1-based page.
pub fn page_file_name(page: usize) -> String {
    format!("barcodes_page_{page}.svg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name(1), "barcodes_page_1.svg");
    }
}
