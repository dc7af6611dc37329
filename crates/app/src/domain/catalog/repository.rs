//! Catalog Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use restock::keys::{ProductUuid, StockKey, VariantUuid};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::catalog::{
    data::{NewProduct, NewVariant},
    records::{ItemDescription, ProductRecord, VariantRecord},
};

const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const CREATE_VARIANT_SQL: &str = include_str!("sql/create_variant.sql");
const DESCRIBE_ITEM_SQL: &str = include_str!("sql/describe_item.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(&product.name)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: &NewVariant,
    ) -> Result<VariantRecord, sqlx::Error> {
        query_as::<Postgres, VariantRecord>(CREATE_VARIANT_SQL)
            .bind(variant.uuid.into_uuid())
            .bind(variant.product.into_uuid())
            .bind(&variant.name)
            .bind(variant.size.as_deref())
            .bind(variant.color.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    /// Names for `key`, or `None` when the product is missing or the variant does not belong
    /// to it.
    pub(crate) async fn describe(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<Option<ItemDescription>, sqlx::Error> {
        let row = query(DESCRIBE_ITEM_SQL)
            .bind(key.product_uuid().into_uuid())
            .bind(key.variant_uuid().map(VariantUuid::into_uuid))
            .fetch_optional(&mut **tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ItemDescription {
            key,
            product_name: row.try_get("product_name")?,
            variant_name: row.try_get("variant_name")?,
            size: row.try_get("size")?,
            color: row.try_get("color")?,
        }))
    }

    pub(crate) async fn exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        key: StockKey,
    ) -> Result<bool, sqlx::Error> {
        Ok(self.describe(tx, key).await?.is_some())
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for VariantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VariantUuid::from_uuid(row.try_get("uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            name: row.try_get("name")?,
            size: row.try_get("size")?,
            color: row.try_get("color")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
