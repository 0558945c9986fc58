//! Label sheet layout.
//!
//! ```text
//!  A4 @ 300 DPI: 2480 x 3508 px
//!  ┌──────────────────────────────────────────────────────────┐
//!  │ margin 50                                                │
//!  │   ┌────────┐ 30 ┌────────┐    ┌────────┐    ┌────────┐   │
//!  │   │ cell   │    │        │ .. │        │ .. │        │   │  5 columns
//!  │   │452x320 │    │        │    │        │    │        │   │  9 rows
//!  │   └────────┘    └────────┘    └────────┘    └────────┘   │  45 per page
//!  │       40                                                 │
//!  │   ┌────────┐ ...                                         │
//!  └──────────────────────────────────────────────────────────┘
//!
//!  cell (x, y)
//!    y +   0  header          bold 24
//!    y +  30  barcode         cell width x 100
//!    y + 140  item name       18, shrinks by 2 down to 12
//!    y + 170  "SKU: ..."      18
//!    y + 200  price           bold 26
//!    y + 240  "Stock: ..."    18
//! ```

use serde::{Deserialize, Serialize};

use super::code128;
use crate::error::{CoreError, CoreResult};
use crate::numeric::format_qty;

pub const HEADER_FONT_SIZE: u32 = 24;
pub const TEXT_FONT_SIZE: u32 = 18;
pub const PRICE_FONT_SIZE: u32 = 26;
pub const MIN_NAME_FONT_SIZE: u32 = 12;
pub const BARCODE_HEIGHT: u32 = 100;
/// Blank modules on each side of the bars.
pub const QUIET_ZONE_MODULES: usize = 10;

/// Fixed page grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetGeometry {
    pub page_width: u32,
    pub page_height: u32,
    pub dpi: u32,
    pub columns: u32,
    pub margin_x: u32,
    pub margin_y: u32,
    pub gap_x: u32,
    pub gap_y: u32,
    pub cell_height: u32,
}

impl SheetGeometry {
    pub const fn a4_300dpi() -> Self {
        SheetGeometry {
            page_width: 2480,
            page_height: 3508,
            dpi: 300,
            columns: 5,
            margin_x: 50,
            margin_y: 50,
            gap_x: 30,
            gap_y: 40,
            cell_height: 320,
        }
    }

    pub fn cell_width(&self) -> u32 {
        let used = 2 * self.margin_x + self.columns.saturating_sub(1) * self.gap_x;
        self.page_width.saturating_sub(used) / self.columns.max(1)
    }

    /// Rows that fit in the printable height; at least one.
    pub fn rows(&self) -> u32 {
        let usable = self.page_height.saturating_sub(2 * self.margin_y);
        (usable / (self.cell_height + self.gap_y)).max(1)
    }

    pub fn per_page(&self) -> usize {
        (self.columns.max(1) * self.rows()) as usize
    }

    /// Top-left corner of the `index`-th cell on a page.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let columns = self.columns.max(1) as usize;
        let row = (index / columns) as u32;
        let col = (index % columns) as u32;
        (
            self.margin_x + col * (self.cell_width() + self.gap_x),
            self.margin_y + row * (self.cell_height + self.gap_y),
        )
    }
}

impl Default for SheetGeometry {
    fn default() -> Self {
        SheetGeometry::a4_300dpi()
    }
}

/// Measures rendered text width in pixels.
pub trait TextMetrics {
    fn text_width(&self, text: &str, size: u32, bold: bool) -> u32;
}

/// Average-advance estimate for a sans-serif face.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMetrics;

impl TextMetrics for ApproxMetrics {
    fn text_width(&self, text: &str, size: u32, bold: bool) -> u32 {
        // em fraction per glyph, in thousandths
        let advance: u64 = if bold { 640 } else { 580 };
        let chars = text.chars().count() as u64;
        (chars * u64::from(size) * advance).div_ceil(1000) as u32
    }
}

/// One item to print, repeated `copies` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub stock_qty: f64,
    pub uom: String,
    pub copies: u32,
}

/// Positioned text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub bold: bool,
}

/// Positioned barcode. `modules` includes the quiet zones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeRun {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub modules: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub header: TextRun,
    pub barcode: BarcodeRun,
    pub name: TextRun,
    pub sku: TextRun,
    pub price: TextRun,
    pub stock: TextRun,
}

/// One page of labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetPage {
    /// 1-based.
    pub number: usize,
    pub labels: Vec<PlacedLabel>,
}

/// Largest name size that fits `max_width`, shrinking by 2 down to the floor.
pub fn fit_name_size(metrics: &impl TextMetrics, name: &str, max_width: u32) -> u32 {
    let mut size = TEXT_FONT_SIZE;
    while metrics.text_width(name, size, false) > max_width && size > MIN_NAME_FONT_SIZE {
        size -= 2;
    }
    size
}

fn centered(
    metrics: &impl TextMetrics,
    text: String,
    cell_x: u32,
    cell_width: u32,
    y: u32,
    size: u32,
    bold: bool,
) -> TextRun {
    let width = metrics.text_width(&text, size, bold);
    TextRun {
        x: cell_x + cell_width.saturating_sub(width) / 2,
        y,
        size,
        bold,
        text,
    }
}

fn with_quiet_zone(bars: Vec<bool>) -> Vec<bool> {
    let mut modules = Vec::with_capacity(bars.len() + 2 * QUIET_ZONE_MODULES);
    modules.extend(std::iter::repeat(false).take(QUIET_ZONE_MODULES));
    modules.extend(bars);
    modules.extend(std::iter::repeat(false).take(QUIET_ZONE_MODULES));
    modules
}

/// Lays `labels` out across as many pages as needed.
///
/// Every label is expanded by its copy count first; the result has
/// `ceil(total / per_page)` pages.
///
/// ## Errors
/// - [`CoreError::NothingToGenerate`] when no copies remain
/// - [`CoreError::Unencodable`] when a SKU cannot be carried by Code 128
pub fn layout_sheets(
    labels: &[LabelSpec],
    header: &str,
    geometry: &SheetGeometry,
    metrics: &impl TextMetrics,
) -> CoreResult<Vec<SheetPage>> {
    let cell_width = geometry.cell_width();

    let mut placed_once = Vec::with_capacity(labels.len());
    for label in labels.iter().filter(|l| l.copies > 0) {
        placed_once.push((label, with_quiet_zone(code128::encode(&label.sku)?)));
    }

    let entries: Vec<_> = placed_once
        .iter()
        .flat_map(|(label, modules)| {
            std::iter::repeat((*label, modules)).take(label.copies as usize)
        })
        .collect();

    if entries.is_empty() {
        return Err(CoreError::NothingToGenerate);
    }

    let pages = entries
        .chunks(geometry.per_page())
        .enumerate()
        .map(|(page_idx, chunk)| {
            let labels = chunk
                .iter()
                .enumerate()
                .map(|(i, (label, modules))| {
                    let (x, y) = geometry.cell_origin(i);
                    let name_size =
                        fit_name_size(metrics, &label.name, cell_width.saturating_sub(10));
                    let stock = format!("Stock: {} {}", format_qty(label.stock_qty), label.uom);

                    PlacedLabel {
                        header: centered(
                            metrics,
                            header.to_string(),
                            x,
                            cell_width,
                            y,
                            HEADER_FONT_SIZE,
                            true,
                        ),
                        barcode: BarcodeRun {
                            x,
                            y: y + 30,
                            width: cell_width,
                            height: BARCODE_HEIGHT,
                            modules: modules.to_vec(),
                        },
                        name: centered(
                            metrics,
                            label.name.clone(),
                            x,
                            cell_width,
                            y + 140,
                            name_size,
                            false,
                        ),
                        sku: centered(
                            metrics,
                            format!("SKU: {}", label.sku),
                            x,
                            cell_width,
                            y + 170,
                            TEXT_FONT_SIZE,
                            false,
                        ),
                        price: centered(
                            metrics,
                            format!("₹{:.2}", label.price),
                            x,
                            cell_width,
                            y + 200,
                            PRICE_FONT_SIZE,
                            true,
                        ),
                        stock: centered(
                            metrics,
                            stock.trim_end().to_string(),
                            x,
                            cell_width,
                            y + 240,
                            TEXT_FONT_SIZE,
                            false,
                        ),
                    }
                })
                .collect();

            SheetPage {
                number: page_idx + 1,
                labels,
            }
        })
        .collect();

    Ok(pages)
}
