//! # Supplier Commands

use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use tijori_core::{NewSupplier, SearchResults, Supplier, DEFAULT_SEARCH_LIMIT};
use tijori_db::SupplierFilter;

use super::{open_input, open_output, print_json, Ctx, PageArgs};
use crate::error::{AppError, AppResult};
use crate::render::{details, opt, page_footer, Table};
use crate::transfer::{self, ImportSummary};

#[derive(Subcommand, Debug)]
pub enum SupplierCommand {
    /// List suppliers, sorted by name
    List {
        /// Text to look for in name, contact, email, phone, GSTIN or city
        #[arg(short, long)]
        q: Option<String>,
        /// active | inactive
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },

    New(SupplierFields),

    /// Change a supplier; omitted fields keep their value, "" clears one
    Edit {
        id: i64,
        #[command(flatten)]
        fields: SupplierFields,
    },

    Show {
        id: i64,
    },

    Delete {
        id: i64,
    },

    /// JSON lookup: {"results": [...]}
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },

    /// Write all suppliers as CSV
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or update suppliers from CSV, matching on name
    Import {
        /// CSV file, or - for stdin
        file: PathBuf,
    },

    /// Write an empty CSV with the import headers
    Template {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct SupplierFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub contact_person: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub pincode: Option<String>,
    #[arg(long)]
    pub gstin: Option<String>,
    /// regular | composition | unregistered ...
    #[arg(long)]
    pub gst_type: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

impl SupplierFields {
    pub fn apply(self, base: NewSupplier) -> NewSupplier {
        NewSupplier {
            name: self.name.unwrap_or(base.name),
            contact_person: self.contact_person.or(base.contact_person),
            email: self.email.or(base.email),
            phone: self.phone.or(base.phone),
            mobile: self.mobile.or(base.mobile),
            address: self.address.or(base.address),
            city: self.city.or(base.city),
            state: self.state.or(base.state),
            pincode: self.pincode.or(base.pincode),
            gstin: self.gstin.or(base.gstin),
            gst_type: self.gst_type.or(base.gst_type),
            status: self.status.or(base.status),
        }
    }
}

fn editable(s: Supplier) -> NewSupplier {
    NewSupplier {
        name: s.name,
        contact_person: s.contact_person,
        email: s.email,
        phone: s.phone,
        mobile: s.mobile,
        address: s.address,
        city: s.city,
        state: s.state,
        pincode: s.pincode,
        gstin: s.gstin,
        gst_type: Some(s.gst_type),
        status: Some(s.status),
    }
}

pub async fn handle(ctx: &Ctx, cmd: SupplierCommand) -> AppResult<()> {
    let repo = ctx.db.suppliers();

    match cmd {
        SupplierCommand::List { q, status, page } => {
            let page = repo.list(&SupplierFilter { q, status }, ctx.page(&page)).await?;
            ctx.emit(&page, |page| {
                let mut table = Table::new(&["ID>", "Name", "Contact", "Phone", "GSTIN", "Status"]);
                for s in &page.items {
                    table.row(vec![
                        s.id.to_string(),
                        s.name.clone(),
                        opt(&s.contact_person),
                        opt(&s.phone),
                        opt(&s.gstin),
                        s.status.clone(),
                    ]);
                }
                format!("{}{}", table.render(), page_footer(page))
            })
        }
        SupplierCommand::New(fields) => {
            let supplier = repo.create(&fields.apply(NewSupplier::default())).await?;
            info!(id = supplier.id, "Supplier created");
            ctx.emit(&supplier, describe)
        }
        SupplierCommand::Edit { id, fields } => {
            let current = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Supplier", &id.to_string()))?;
            let supplier = repo.update(id, &fields.apply(editable(current))).await?;
            ctx.emit(&supplier, describe)
        }
        SupplierCommand::Show { id } => {
            let supplier = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Supplier", &id.to_string()))?;
            ctx.emit(&supplier, describe)
        }
        SupplierCommand::Delete { id } => {
            repo.delete(id).await?;
            ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
                format!("Deleted supplier {}", id)
            })
        }
        SupplierCommand::Search { query, limit } => {
            let hits = repo.search(&query, limit).await?;
            print_json(&SearchResults::from(hits))
        }
        SupplierCommand::Export { output } => {
            let rows = transfer::export_suppliers(&ctx.db, open_output(output.as_deref())?).await?;
            if output.is_some() {
                eprintln!("Exported {} suppliers", rows);
            }
            Ok(())
        }
        SupplierCommand::Import { file } => {
            let summary = transfer::import_suppliers(&ctx.db, open_input(&file)?).await?;
            ctx.emit(&summary, describe_import)
        }
        SupplierCommand::Template { output } => {
            transfer::supplier_template(open_output(output.as_deref())?)
        }
    }
}

fn describe(s: &Supplier) -> String {
    details(&[
        ("ID", s.id.to_string()),
        ("Name", s.name.clone()),
        ("Contact", opt(&s.contact_person)),
        ("Email", opt(&s.email)),
        ("Phone", opt(&s.phone)),
        ("Mobile", opt(&s.mobile)),
        ("Address", opt(&s.address)),
        ("City", opt(&s.city)),
        ("State", opt(&s.state)),
        ("Pincode", opt(&s.pincode)),
        ("GSTIN", opt(&s.gstin)),
        ("GST type", s.gst_type.clone()),
        ("Status", s.status.clone()),
    ])
}

/// Shared with the item import.
pub(crate) fn describe_import(summary: &ImportSummary) -> String {
    let mut out = format!(
        "Created {}, updated {}, skipped {} without a name",
        summary.created, summary.updated, summary.skipped
    );
    for row in &summary.rejected {
        out.push_str(&format!("\n  line {}: {}", row.line, row.message));
    }
    out
}
