//! Catalog Records

use jiff::Timestamp;
use restock::keys::{ProductUuid, StockKey, VariantUuid};

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Variant Record
#[derive(Debug, Clone)]
pub struct VariantRecord {
    pub uuid: VariantUuid,
    pub product: ProductUuid,
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Display details for a stock key, used when rendering messages and listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDescription {
    pub key: StockKey,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl ItemDescription {
    /// "Product" or "Product (Variant)".
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.variant_name {
            Some(variant) => format!("{} ({variant})", self.product_name),
            None => self.product_name.clone(),
        }
    }
}
