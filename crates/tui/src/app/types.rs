use crate::verification::FlowEvent;

pub enum AppAsyncEvent {
    Flow(FlowEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopView {
    Catalog,
    Checkout,
}

#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub name: &'static str,
    pub vintage: u16,
    pub region: &'static str,
    pub price_cents: u32,
    pub description: &'static str,
}

impl Product {
    pub fn price_label(&self) -> String {
        format!("€{}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

pub const FEATURED: Product = Product {
    name: "Château Margaux Grand Vin",
    vintage: 2018,
    region: "Bordeaux, France",
    price_cents: 4_999,
    description: "Deep ruby red with notes of blackcurrant, violet and cedar.",
};
