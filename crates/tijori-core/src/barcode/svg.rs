//! SVG rendering of a laid-out sheet page.

use std::fmt::Write;

use super::layout::{BarcodeRun, SheetGeometry, SheetPage, TextRun};

const FONT_FAMILY: &str = "DejaVu Sans, Arial, sans-serif";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_text(out: &mut String, run: &TextRun) {
    // SVG places text on its baseline; the layout gives the top edge
    let baseline = run.y + run.size;
    let weight = if run.bold { "bold" } else { "normal" };
    let _ = writeln!(
        out,
        r#"  <text x="{}" y="{}" font-size="{}" font-weight="{}">{}</text>"#,
        run.x,
        baseline,
        run.size,
        weight,
        escape(&run.text)
    );
}

fn write_barcode(out: &mut String, run: &BarcodeRun) {
    if run.modules.is_empty() {
        return;
    }
    let module_width = f64::from(run.width) / run.modules.len() as f64;

    let mut i = 0;
    while i < run.modules.len() {
        if !run.modules[i] {
            i += 1;
            continue;
        }
        let start = i;
        while i < run.modules.len() && run.modules[i] {
            i += 1;
        }
        let _ = writeln!(
            out,
            r#"  <rect x="{:.3}" y="{}" width="{:.3}" height="{}"/>"#,
            f64::from(run.x) + start as f64 * module_width,
            run.y,
            (i - start) as f64 * module_width,
            run.height
        );
    }
}

/// Renders one page as a standalone SVG document at the sheet's pixel size.
pub fn render_page(page: &SheetPage, geometry: &SheetGeometry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{FONT_FAMILY}">"#,
        w = geometry.page_width,
        h = geometry.page_height,
    );
    let _ = writeln!(out, r#"  <rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(out, r#"  <g fill="black">"#);

    for label in &page.labels {
        write_text(&mut out, &label.header);
        write_barcode(&mut out, &label.barcode);
        write_text(&mut out, &label.name);
        write_text(&mut out, &label.sku);
        write_text(&mut out, &label.price);
        write_text(&mut out, &label.stock);
    }

    out.push_str("  </g>\n</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::layout::{layout_sheets, ApproxMetrics, LabelSpec};

    fn page(name: &str) -> (SheetPage, SheetGeometry) {
        let geometry = SheetGeometry::a4_300dpi();
        let pages = layout_sheets(
            &[LabelSpec {
                name: name.to_string(),
                sku: "A".to_string(),
                price: 10.0,
                stock_qty: 1.0,
                uom: "Nos".to_string(),
                copies: 1,
            }],
            "TIJORI",
            &geometry,
            &ApproxMetrics,
        )
        .unwrap();
        (pages.into_iter().next().unwrap(), geometry)
    }

    #[test]
    fn test_page_dimensions_and_text() {
        let (page, geometry) = page("Cotton Shirt");
        let svg = render_page(&page, &geometry);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="2480" height="3508""#));
        assert!(svg.contains(">Cotton Shirt</text>"));
        assert!(svg.contains(">SKU: A</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_bar_count_matches_modules() {
        let (page, geometry) = page("x");
        let svg = render_page(&page, &geometry);
        let modules = &page.labels[0].barcode.modules;
        let bars = modules
            .iter()
            .zip(modules.iter().skip(1))
            .filter(|(a, b)| !**a && **b)
            .count();
        // one background rect plus one rect per bar
        assert_eq!(svg.matches("<rect").count(), bars + 1);
    }

    #[test]
    fn test_text_is_escaped() {
        let (page, geometry) = page("Salt & <Pepper>");
        let svg = render_page(&page, &geometry);
        assert!(svg.contains("Salt &amp; &lt;Pepper&gt;"));
        assert!(!svg.contains("<Pepper>"));
    }
}
