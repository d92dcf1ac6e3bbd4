//! Repository implementation for categories and products.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::analytics::AnalyticsEvent;
use crate::domain::catalog::{Category, CategoryWithCount, NewCategory, Product, ProductDraft};
use crate::domain::types::{CategoryId, ProductId, Slug};
use crate::models::catalog::{
    Category as DbCategory, NewCategory as DbNewCategory, NewProduct as DbNewProduct,
    Product as DbProduct, UpdateProduct as DbUpdateProduct,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, LIKE_ESCAPE, ProductListQuery,
    ProductReader, ProductWriter, contains_pattern,
};
use crate::schema::{categories, counters, products};

fn to_category(db_category: DbCategory) -> RepositoryResult<Category> {
    Category::try_from(db_category).map_err(RepositoryError::from)
}

fn to_product(db_product: DbProduct) -> RepositoryResult<Product> {
    Product::try_from(db_product).map_err(RepositoryError::from)
}

/// Builds the filtered product query shared by the listing and its count.
fn filtered_products(query: &ProductListQuery) -> products::BoxedQuery<'static, Sqlite> {
    let mut items = products::table.into_boxed::<Sqlite>();

    if query.published_only {
        items = items.filter(products::is_published.eq(true));
    }

    if let Some(category_id) = query.category_id {
        items = items.filter(products::category_id.eq(category_id.get()));
    }

    if let Some(term) = &query.search {
        let pattern = contains_pattern(term);
        items = items.filter(
            products::name
                .like(pattern.clone())
                .escape(LIKE_ESCAPE)
                .or(products::sku.like(pattern.clone()).escape(LIKE_ESCAPE))
                .or(products::description.like(pattern).escape(LIKE_ESCAPE)),
        );
    }

    items
}

/// Picks the first free slug among `base`, `base-2`, `base-3`, ...
fn unique_slug(conn: &mut SqliteConnection, base: &Slug) -> QueryResult<Slug> {
    let taken: HashSet<String> = products::table
        .filter(
            products::slug
                .eq(base.as_str())
                .or(products::slug.like(format!("{}-%", base.as_str()))),
        )
        .select(products::slug)
        .load::<String>(conn)?
        .into_iter()
        .collect();

    if !taken.contains(base.as_str()) {
        return Ok(base.clone());
    }

    let mut n = 2;
    loop {
        let candidate = base.with_suffix(n);
        if !taken.contains(candidate.as_str()) {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn insert_product(conn: &mut SqliteConnection, draft: &ProductDraft) -> RepositoryResult<Product> {
    let base = Slug::from_text(draft.name.as_str())?;

    let db_product = conn.immediate_transaction::<DbProduct, diesel::result::Error, _>(|conn| {
        let slug = unique_slug(conn, &base)?;
        diesel::insert_into(products::table)
            .values(&DbNewProduct::from_draft(draft, &slug))
            .get_result::<DbProduct>(conn)
    })?;

    to_product(db_product)
}

impl CategoryReader for DieselRepository {
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let mut conn = self.conn()?;
        categories::table
            .filter(categories::id.eq(id.get()))
            .first::<DbCategory>(&mut conn)
            .optional()?
            .map(to_category)
            .transpose()
    }

    fn get_category_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Category>> {
        let mut conn = self.conn()?;
        categories::table
            .filter(categories::slug.eq(slug.as_str()))
            .first::<DbCategory>(&mut conn)
            .optional()?
            .map(to_category)
            .transpose()
    }

    fn list_categories(&self) -> RepositoryResult<Vec<CategoryWithCount>> {
        let mut conn = self.conn()?;

        let db_categories = categories::table
            .order(categories::name.asc())
            .load::<DbCategory>(&mut conn)?;

        let counts: HashMap<i32, i64> = products::table
            .filter(products::category_id.is_not_null())
            .group_by(products::category_id)
            .select((products::category_id, diesel::dsl::count_star()))
            .load::<(Option<i32>, i64)>(&mut conn)?
            .into_iter()
            .filter_map(|(category_id, count)| category_id.map(|id| (id, count)))
            .collect();

        db_categories
            .into_iter()
            .map(|db_category| {
                let products = counts.get(&db_category.id).copied().unwrap_or(0);
                Ok(CategoryWithCount {
                    category: to_category(db_category)?,
                    products,
                })
            })
            .collect()
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category> {
        let mut conn = self.conn()?;
        let db_new_category: DbNewCategory = new_category.into();

        let db_category = diesel::insert_into(categories::table)
            .values(&db_new_category)
            .get_result::<DbCategory>(&mut conn)?;

        to_category(db_category)
    }

    fn update_category(
        &self,
        id: CategoryId,
        updates: &NewCategory,
    ) -> RepositoryResult<Category> {
        let mut conn = self.conn()?;
        let db_updates: DbNewCategory = updates.into();

        let db_category = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set(&db_updates)
            .get_result::<DbCategory>(&mut conn)?;

        to_category(db_category)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            diesel::update(products::table.filter(products::category_id.eq(id.get())))
                .set(products::category_id.eq(None::<i32>))
                .execute(conn)?;
            let deleted =
                diesel::delete(categories::table.filter(categories::id.eq(id.get())))
                    .execute(conn)?;
            if deleted == 0 {
                return Err(diesel::result::Error::NotFound);
            }
            Ok(())
        })?;

        Ok(())
    }

    fn get_or_create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category> {
        let mut conn = self.conn()?;
        let db_new_category: DbNewCategory = new_category.into();

        let db_category = conn.transaction::<DbCategory, diesel::result::Error, _>(|conn| {
            diesel::insert_into(categories::table)
                .values(&db_new_category)
                .on_conflict(categories::slug)
                .do_nothing()
                .execute(conn)?;

            categories::table
                .filter(categories::slug.eq(new_category.slug.as_str()))
                .first::<DbCategory>(conn)
        })?;

        to_category(db_category)
    }
}

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        let mut conn = self.conn()?;
        products::table
            .filter(products::id.eq(id.get()))
            .first::<DbProduct>(&mut conn)
            .optional()?
            .map(to_product)
            .transpose()
    }

    fn get_product_by_slug(&self, slug: &Slug) -> RepositoryResult<Option<Product>> {
        let mut conn = self.conn()?;
        products::table
            .filter(products::slug.eq(slug.as_str()))
            .first::<DbProduct>(&mut conn)
            .optional()?
            .map(to_product)
            .transpose()
    }

    fn get_products_by_ids(&self, ids: &[ProductId]) -> RepositoryResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        products::table
            .filter(products::id.eq_any(raw_ids))
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(to_product)
            .collect()
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_products(&query).count().get_result(&mut conn)?;

        let mut items = filtered_products(&query).order(products::name.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let products = items
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(to_product)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, products))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, draft: &ProductDraft) -> RepositoryResult<Product> {
        let mut conn = self.conn()?;
        insert_product(&mut conn, draft)
    }

    fn update_product(&self, id: ProductId, draft: &ProductDraft) -> RepositoryResult<Product> {
        let mut conn = self.conn()?;
        let db_updates = DbUpdateProduct::from_draft(draft, Utc::now().naive_utc());

        let db_product = diesel::update(products::table.filter(products::id.eq(id.get())))
            .set(&db_updates)
            .get_result::<DbProduct>(&mut conn)?;

        to_product(db_product)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let view_key = AnalyticsEvent::ProductView(id).counter_key();

        conn.immediate_transaction(|conn| {
            let deleted = diesel::delete(products::table.filter(products::id.eq(id.get())))
                .execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            diesel::delete(counters::table.filter(counters::key.eq(view_key))).execute(conn)?;
            Ok(())
        })
    }

    fn upsert_product_by_sku(&self, draft: &ProductDraft) -> RepositoryResult<Product> {
        let mut conn = self.conn()?;

        let Some(sku) = &draft.sku else {
            return insert_product(&mut conn, draft);
        };

        let existing = products::table
            .filter(products::sku.eq(sku.as_str()))
            .select(products::id)
            .first::<i32>(&mut conn)
            .optional()?;

        match existing {
            Some(id) => {
                let db_updates = DbUpdateProduct::from_draft(draft, Utc::now().naive_utc());
                let db_product = diesel::update(products::table.filter(products::id.eq(id)))
                    .set(&db_updates)
                    .get_result::<DbProduct>(&mut conn)?;
                to_product(db_product)
            }
            None => insert_product(&mut conn, draft),
        }
    }
}
