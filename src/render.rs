use ramhorns::{Content, Template};

use crate::model::{EnrichedDeal, User};

/// Renders one user's deal list into the HTML email body.
pub trait EmailRenderer: Send + Sync {
    fn render(&self, user: &User, deals: &[EnrichedDeal]) -> anyhow::Result<String>;
}

#[derive(Content)]
struct DealContext {
    retailer: String,
    product: String,
    size: String,
    price: String,
    start_date: String,
    end_date: String,
}

#[derive(Content)]
struct EmailContext {
    email: String,
    deal_count: usize,
    deals: Vec<DealContext>,
}

/// Mustache template compiled once at startup from the template file.
pub struct DealTemplate {
    template: Template<'static>,
}

impl DealTemplate {
    pub fn new(source: String) -> anyhow::Result<Self> {
        let template = Template::new(source)?;
        Ok(Self { template })
    }
}

impl EmailRenderer for DealTemplate {
    fn render(&self, user: &User, deals: &[EnrichedDeal]) -> anyhow::Result<String> {
        let ctx = EmailContext {
            email: user.email.clone(),
            deal_count: deals.len(),
            deals: deals
                .iter()
                .map(|d| DealContext {
                    retailer: d.retailer_name.clone(),
                    product: d.product_name.clone(),
                    size: d.product_size.clone(),
                    price: d.price.to_string(),
                    start_date: d.start_date.to_string(),
                    end_date: d.end_date.to_string(),
                })
                .collect(),
        };
        Ok(self.template.render(&ctx))
    }
}
