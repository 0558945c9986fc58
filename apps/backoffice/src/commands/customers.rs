//! # Customer Commands

use clap::{Args, Subcommand};
use tracing::info;

use tijori_core::{Customer, NewCustomer, SearchResults, DEFAULT_SEARCH_LIMIT};
use tijori_db::CustomerFilter;

use super::{print_json, Ctx, PageArgs};
use crate::error::{AppError, AppResult};
use crate::render::{details, opt, page_footer, Table};

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// List customers, sorted by name
    List {
        /// Text to look for in name, email, phone, mobile or city
        #[arg(short, long)]
        q: Option<String>,
        #[arg(long)]
        city: Option<String>,
        /// active | inactive
        #[arg(long)]
        status: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Add a customer
    New(CustomerFields),

    /// Change a customer; omitted fields keep their value, "" clears one
    Edit {
        id: i64,
        #[command(flatten)]
        fields: CustomerFields,
    },

    Show {
        id: i64,
    },

    /// Delete a customer without documents
    Delete {
        id: i64,
    },

    /// JSON lookup for line entry: {"results": [...]}
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
}

#[derive(Args, Debug, Default)]
pub struct CustomerFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub pincode: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

impl CustomerFields {
    /// Overlays the given flags on `base`.
    pub fn apply(self, base: NewCustomer) -> NewCustomer {
        NewCustomer {
            name: self.name.unwrap_or(base.name),
            email: self.email.or(base.email),
            mobile: self.mobile.or(base.mobile),
            phone: self.phone.or(base.phone),
            address: self.address.or(base.address),
            city: self.city.or(base.city),
            pincode: self.pincode.or(base.pincode),
            state: self.state.or(base.state),
            country: self.country.or(base.country),
            notes: self.notes.or(base.notes),
            status: self.status.or(base.status),
        }
    }
}

fn editable(c: Customer) -> NewCustomer {
    NewCustomer {
        name: c.name,
        email: c.email,
        mobile: c.mobile,
        phone: c.phone,
        address: c.address,
        city: c.city,
        pincode: c.pincode,
        state: c.state,
        country: c.country,
        notes: c.notes,
        status: Some(c.status),
    }
}

pub async fn handle(ctx: &Ctx, cmd: CustomerCommand) -> AppResult<()> {
    let repo = ctx.db.customers();

    match cmd {
        CustomerCommand::List { q, city, status, page } => {
            let filter = CustomerFilter { q, city, status };
            let page = repo.list(&filter, ctx.page(&page)).await?;
            ctx.emit(&page, |page| {
                let mut table = Table::new(&["ID>", "Name", "Mobile", "Email", "City", "Status"]);
                for c in &page.items {
                    table.row(vec![
                        c.id.to_string(),
                        c.name.clone(),
                        opt(&c.mobile),
                        opt(&c.email),
                        opt(&c.city),
                        c.status.clone(),
                    ]);
                }
                format!("{}{}", table.render(), page_footer(page))
            })
        }
        CustomerCommand::New(fields) => {
            let customer = repo.create(&fields.apply(NewCustomer::default())).await?;
            info!(id = customer.id, "Customer created");
            ctx.emit(&customer, describe)
        }
        CustomerCommand::Edit { id, fields } => {
            let current = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Customer", &id.to_string()))?;
            let customer = repo.update(id, &fields.apply(editable(current))).await?;
            ctx.emit(&customer, describe)
        }
        CustomerCommand::Show { id } => {
            let customer = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Customer", &id.to_string()))?;
            ctx.emit(&customer, describe)
        }
        CustomerCommand::Delete { id } => {
            repo.delete(id).await?;
            ctx.emit(&serde_json::json!({ "deleted": id }), |_| {
                format!("Deleted customer {}", id)
            })
        }
        CustomerCommand::Search { query, limit } => {
            let hits = repo.search(&query, limit).await?;
            print_json(&SearchResults::from(hits))
        }
    }
}

fn describe(c: &Customer) -> String {
    details(&[
        ("ID", c.id.to_string()),
        ("Name", c.name.clone()),
        ("Email", opt(&c.email)),
        ("Mobile", opt(&c.mobile)),
        ("Phone", opt(&c.phone)),
        ("Address", opt(&c.address)),
        ("City", opt(&c.city)),
        ("Pincode", opt(&c.pincode)),
        ("State", opt(&c.state)),
        ("Country", opt(&c.country)),
        ("Notes", opt(&c.notes)),
        ("Status", c.status.clone()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_keeps_omitted_fields() {
        let base = NewCustomer {
            name: "Asha Traders".to_string(),
            city: Some("Pune".to_string()),
            email: Some("asha@example.com".to_string()),
            ..Default::default()
        };
        let fields = CustomerFields {
            city: Some("Mumbai".to_string()),
            email: Some(String::new()),
            ..Default::default()
        };

        let merged = fields.apply(base);
        assert_eq!(merged.name, "Asha Traders");
        assert_eq!(merged.city.as_deref(), Some("Mumbai"));
        // Cleared by the repository's optional-field cleaning
        assert_eq!(merged.email.as_deref(), Some(""));
    }
}
