//! Test Helpers

use jiff::{SignedDuration, Timestamp};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use restock::keys::{ProductUuid, StockKey, VariantUuid};

use crate::{
    domain::catalog::{
        CatalogService, CatalogServiceError,
        data::{NewProduct, NewVariant},
    },
    test::TestContext,
};

impl TestContext {
    pub(crate) async fn create_product(&self, name: &str) -> Result<ProductUuid, CatalogServiceError> {
        let product = self
            .catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                name: name.to_string(),
            })
            .await?;

        Ok(product.uuid)
    }

    pub(crate) async fn create_variant(
        &self,
        product: ProductUuid,
        name: &str,
    ) -> Result<VariantUuid, CatalogServiceError> {
        let variant = self
            .catalog
            .create_variant(NewVariant {
                uuid: VariantUuid::new(),
                product,
                name: name.to_string(),
                size: None,
                color: None,
            })
            .await?;

        Ok(variant.uuid)
    }

    /// Whole seconds, `days` from now, so values survive a round trip through the database.
    pub(crate) fn future_date(&self, days: i64) -> Result<Timestamp, jiff::Error> {
        let later = Timestamp::now().checked_add(SignedDuration::from_hours(days * 24))?;

        Timestamp::from_second(later.as_second())
    }

    /// Move an expected restock date into the past, bypassing validation.
    pub(crate) async fn backdate_schedule(
        &self,
        key: StockKey,
        expected: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE restock_schedules SET expected_date = $3 \
             WHERE product_uuid = $1 AND variant_key = $2",
        )
        .bind(key.product_uuid().into_uuid())
        .bind(key.variant_key())
        .bind(SqlxTimestamp::from(expected))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}
