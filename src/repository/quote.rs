//! Repository implementation for quotations.

use chrono::Utc;
use diesel::dsl::{count_star, max};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::quote::{
    NewQuote, Quote, QuoteItem, QuoteStatus, QuoteWithItems, format_quote_number,
};
use crate::domain::types::QuoteId;
use crate::models::analytics::NewCounter as DbNewCounter;
use crate::models::quote::{
    NewQuote as DbNewQuote, NewQuoteItem as DbNewQuoteItem, Quote as DbQuote,
    QuoteItem as DbQuoteItem,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, LIKE_ESCAPE, QuoteListQuery, QuoteReader, QuoteWriter, contains_pattern,
};
use crate::schema::{counters, quote_items, quotes};

/// Counter row holding the last sequence ever issued, so numbers of deleted
/// quotes are not handed out again.
const QUOTE_SEQUENCE_KEY: &str = "quote_sequence";

fn next_sequence(conn: &mut SqliteConnection) -> QueryResult<i32> {
    let issued: Option<i64> = counters::table
        .filter(counters::key.eq(QUOTE_SEQUENCE_KEY))
        .select(counters::count)
        .first(conn)
        .optional()?;
    let last: Option<i32> = quotes::table.select(max(quotes::sequence)).first(conn)?;

    let last = issued
        .and_then(|issued| i32::try_from(issued).ok())
        .unwrap_or(0)
        .max(last.unwrap_or(0));
    let sequence = last + 1;
    let now = Utc::now().naive_utc();

    diesel::insert_into(counters::table)
        .values(&DbNewCounter {
            key: QUOTE_SEQUENCE_KEY,
            count: i64::from(sequence),
            updated_at: now,
        })
        .on_conflict(counters::key)
        .do_update()
        .set((
            counters::count.eq(i64::from(sequence)),
            counters::updated_at.eq(now),
        ))
        .execute(conn)?;

    Ok(sequence)
}

fn to_quote(db_quote: DbQuote) -> RepositoryResult<Quote> {
    Quote::try_from(db_quote).map_err(RepositoryError::from)
}

fn filtered_quotes(query: &QuoteListQuery) -> quotes::BoxedQuery<'static, Sqlite> {
    let mut items = quotes::table.into_boxed::<Sqlite>();

    if let Some(status) = query.status {
        items = items.filter(quotes::status.eq(status.as_str()));
    }

    if let Some(company_id) = query.company_id {
        items = items.filter(quotes::company_id.eq(company_id.get()));
    }

    if let Some(term) = &query.search {
        let pattern = contains_pattern(term);
        items = items.filter(
            quotes::number
                .like(pattern.clone())
                .escape(LIKE_ESCAPE)
                .or(quotes::customer_name.like(pattern.clone()).escape(LIKE_ESCAPE))
                .or(quotes::customer_email.like(pattern).escape(LIKE_ESCAPE)),
        );
    }

    items
}

impl QuoteReader for DieselRepository {
    fn get_quote_by_id(&self, id: QuoteId) -> RepositoryResult<Option<QuoteWithItems>> {
        let mut conn = self.conn()?;

        let Some(db_quote) = quotes::table
            .filter(quotes::id.eq(id.get()))
            .first::<DbQuote>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let items = DbQuoteItem::belonging_to(&db_quote)
            .order(quote_items::position.asc())
            .load::<DbQuoteItem>(&mut conn)?
            .into_iter()
            .map(|item| QuoteItem::try_from(item).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Some(QuoteWithItems {
            quote: to_quote(db_quote)?,
            items,
        }))
    }

    fn list_quotes(&self, query: QuoteListQuery) -> RepositoryResult<(usize, Vec<Quote>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_quotes(&query).count().get_result(&mut conn)?;

        let mut items = filtered_quotes(&query).order(quotes::sequence.desc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let quotes = items
            .load::<DbQuote>(&mut conn)?
            .into_iter()
            .map(to_quote)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, quotes))
    }

    fn count_quotes_by_status(&self) -> RepositoryResult<Vec<(QuoteStatus, i64)>> {
        let mut conn = self.conn()?;

        let rows = quotes::table
            .group_by(quotes::status)
            .select((quotes::status, count_star()))
            .load::<(String, i64)>(&mut conn)?;

        rows.into_iter()
            .map(|(status, count)| {
                let status = QuoteStatus::try_from(status.as_str())?;
                Ok((status, count))
            })
            .collect()
    }
}

impl QuoteWriter for DieselRepository {
    fn create_quote(&self, new_quote: &NewQuote, prefix: &str) -> RepositoryResult<Quote> {
        let mut conn = self.conn()?;

        // IMMEDIATE takes the write lock before reading the last sequence,
        // so concurrent creations cannot compute the same one.
        let db_quote = conn.immediate_transaction::<DbQuote, diesel::result::Error, _>(|conn| {
            let sequence = next_sequence(conn)?;
            let number = format_quote_number(prefix, sequence);

            let db_quote = diesel::insert_into(quotes::table)
                .values(&DbNewQuote::from_domain(new_quote, sequence, number))
                .get_result::<DbQuote>(conn)?;

            let db_items = new_quote
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| DbNewQuoteItem::from_draft(db_quote.id, index as i32 + 1, item))
                .collect::<Vec<_>>();

            diesel::insert_into(quote_items::table)
                .values(&db_items)
                .execute(conn)?;

            Ok(db_quote)
        })?;

        to_quote(db_quote)
    }

    fn update_quote_status(&self, id: QuoteId, status: QuoteStatus) -> RepositoryResult<Quote> {
        let mut conn = self.conn()?;

        let db_quote = diesel::update(quotes::table.filter(quotes::id.eq(id.get())))
            .set((
                quotes::status.eq(status.as_str()),
                quotes::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbQuote>(&mut conn)?;

        to_quote(db_quote)
    }

    fn delete_quote(&self, id: QuoteId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted =
            diesel::delete(quotes::table.filter(quotes::id.eq(id.get()))).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
