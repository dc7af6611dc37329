//! Catalog Data

use restock::keys::{ProductUuid, VariantUuid};

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
}

/// New Variant Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub uuid: VariantUuid,
    pub product: ProductUuid,
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
}
