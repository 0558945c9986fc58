//! # Barcode Sheet Archive
//!
//! ```text
//!  picks (item id [:copies]) ──► items().labels(ids) ──► LabelSpec
//!                                                           │
//!                            layout_sheets(A4 @ 300 DPI) ◄──┘
//!                                       │
//!                    render_page ──► barcodes_page_<n>.svg ──► ZIP
//! ```
//!
//! Pages are laid out before the archive file is created, so an empty
//! selection fails with "no barcodes to generate" and leaves no file behind.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use tijori_core::barcode::{layout_sheets, page_file_name, render_page};
use tijori_core::barcode::{ApproxMetrics, LabelSpec, SheetGeometry, SheetPage};
use tijori_core::ValidationError;
use tijori_db::Database;

use crate::error::AppResult;

/// One selected item: `12` or `12:3` (three copies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPick {
    pub item_id: i64,
    pub copies: Option<u32>,
}

impl FromStr for LabelPick {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, copies) = match s.split_once(':') {
            Some((id, copies)) => (id, Some(copies)),
            None => (s, None),
        };

        let item_id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid("item", format!("'{}' is not an item id", id)))?;
        let copies = copies
            .map(|c| {
                c.trim().parse::<u32>().map_err(|_| {
                    ValidationError::invalid("copies", format!("'{}' is not a count", c))
                })
            })
            .transpose()?;

        Ok(LabelPick { item_id, copies })
    }
}

/// Builds label specs for `picks`, or for every item with a SKU when
/// `picks` is empty. Unknown ids and items without a SKU are left out.
pub async fn label_specs(
    db: &Database,
    picks: &[LabelPick],
    default_copies: u32,
) -> AppResult<Vec<LabelSpec>> {
    let ids: Vec<i64> = picks.iter().map(|p| p.item_id).collect();
    let copies: HashMap<i64, u32> = picks
        .iter()
        .map(|p| (p.item_id, p.copies.unwrap_or(default_copies)))
        .collect();

    let items = db.items().labels(&ids).await?;
    let specs: Vec<LabelSpec> = items
        .into_iter()
        .filter_map(|item| {
            let sku = item.sku?;
            Some(LabelSpec {
                copies: copies.get(&item.id).copied().unwrap_or(default_copies),
                name: item.name,
                sku,
                price: item.selling_price,
                stock_qty: item.stock_qty,
                uom: item.uom,
            })
        })
        .collect();

    debug!(picked = picks.len(), labels = specs.len(), "Built label specs");
    Ok(specs)
}

/// Writes one SVG per page into a ZIP archive and returns the writer.
pub fn write_archive<W: Write + Seek>(
    pages: &[SheetPage],
    geometry: &SheetGeometry,
    writer: W,
) -> AppResult<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for page in pages {
        zip.start_file(page_file_name(page.number), options)?;
        zip.write_all(render_page(page, geometry).as_bytes())?;
    }

    Ok(zip.finish()?)
}

/// Lays out, renders and archives labels to `output`. Returns the page count.
pub async fn generate(
    db: &Database,
    picks: &[LabelPick],
    default_copies: u32,
    header: &str,
    output: &Path,
) -> AppResult<usize> {
    let specs = label_specs(db, picks, default_copies).await?;

    let geometry = SheetGeometry::a4_300dpi();
    let pages = layout_sheets(&specs, header, &geometry, &ApproxMetrics)?;

    let file = BufWriter::new(File::create(output)?);
    let mut file = write_archive(&pages, &geometry, file)?;
    file.flush()?;

    info!(pages = pages.len(), path = %output.display(), "Barcode sheets written");
    Ok(pages.len())
}
