//! Diesel model for usage counters.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::analytics::Counter as DomainCounter;

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::counters)]
#[diesel(primary_key(key))]
pub struct Counter {
    pub key: String,
    pub count: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::counters)]
pub struct NewCounter<'a> {
    pub key: &'a str,
    pub count: i64,
    pub updated_at: NaiveDateTime,
}

impl From<Counter> for DomainCounter {
    fn from(counter: Counter) -> Self {
        Self {
            key: counter.key,
            count: counter.count,
        }
    }
}
