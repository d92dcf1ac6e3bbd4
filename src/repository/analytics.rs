//! Repository implementation for usage counters.

use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::analytics::{
    Counter, ProductViews, product_id_from_key, product_view_prefix,
};
use crate::domain::catalog::Product;
use crate::models::analytics::{Counter as DbCounter, NewCounter as DbNewCounter};
use crate::models::catalog::Product as DbProduct;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    AnalyticsReader, AnalyticsWriter, DieselRepository, LIKE_ESCAPE, escape_like,
};
use crate::schema::{counters, products};

impl AnalyticsWriter for DieselRepository {
    fn increment_counter(&self, key: &str) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        diesel::insert_into(counters::table)
            .values(&DbNewCounter {
                key,
                count: 1,
                updated_at: now,
            })
            .on_conflict(counters::key)
            .do_update()
            .set((
                counters::count.eq(counters::count + 1),
                counters::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}

impl AnalyticsReader for DieselRepository {
    fn list_counters(&self, keys: &[String]) -> RepositoryResult<Vec<Counter>> {
        let mut conn = self.conn()?;

        let stored: HashMap<String, i64> = counters::table
            .filter(counters::key.eq_any(keys))
            .load::<DbCounter>(&mut conn)?
            .into_iter()
            .map(|counter| (counter.key, counter.count))
            .collect();

        // Counters that were never hit are reported as zero.
        Ok(keys
            .iter()
            .map(|key| Counter {
                key: key.clone(),
                count: stored.get(key).copied().unwrap_or(0),
            })
            .collect())
    }

    fn top_product_views(&self, limit: usize) -> RepositoryResult<Vec<ProductViews>> {
        let mut conn = self.conn()?;

        // Ranked over every product counter: rows left by deleted products
        // are dropped before the limit is applied.
        let ranked = counters::table
            .filter(
                counters::key
                    .like(format!("{}%", escape_like(product_view_prefix())))
                    .escape(LIKE_ESCAPE),
            )
            .order((counters::count.desc(), counters::key.asc()))
            .load::<DbCounter>(&mut conn)?;

        let views: Vec<(i32, i64)> = ranked
            .iter()
            .filter_map(|counter| {
                product_id_from_key(&counter.key).map(|id| (id.get(), counter.count))
            })
            .collect();

        let ids: Vec<i32> = views.iter().map(|(id, _)| *id).collect();
        let mut products: HashMap<i32, DbProduct> = products::table
            .filter(products::id.eq_any(ids))
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        views
            .into_iter()
            .filter_map(|(id, count)| products.remove(&id).map(|product| (product, count)))
            .take(limit)
            .map(|(product, views)| {
                Ok(ProductViews {
                    product: Product::try_from(product).map_err(RepositoryError::from)?,
                    views,
                })
            })
            .collect()
    }
}
