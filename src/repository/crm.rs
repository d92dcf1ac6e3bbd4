//! Repository implementation for companies and contacts.
//!
//! Upserts merge incoming data into the stored row: provided optional values
//! replace the stored ones while missing values leave them untouched.

use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Text};
use diesel::sqlite::Sqlite;
use diesel::upsert::excluded;

use crate::domain::crm::{Company, CompanyUpsert, Contact, ContactUpsert};
use crate::domain::types::{CompanyId, ContactId};
use crate::models::crm::{
    Company as DbCompany, Contact as DbContact, NewCompany as DbNewCompany,
    NewContact as DbNewContact,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CompanyListQuery, CompanyReader, CompanyWriter, DieselRepository, LIKE_ESCAPE,
    contains_pattern,
};
use crate::schema::{companies, contacts};

diesel::define_sql_function! {
    fn coalesce(x: Nullable<Text>, y: Nullable<Text>) -> Nullable<Text>;
}

diesel::define_sql_function! {
    #[sql_name = "coalesce"]
    fn coalesce_int(x: Nullable<Integer>, y: Nullable<Integer>) -> Nullable<Integer>;
}

fn filtered_companies(query: &CompanyListQuery) -> companies::BoxedQuery<'static, Sqlite> {
    let mut items = companies::table.into_boxed::<Sqlite>();

    if let Some(term) = &query.search {
        let pattern = contains_pattern(term);
        items = items.filter(
            companies::name
                .like(pattern.clone())
                .escape(LIKE_ESCAPE)
                .or(companies::tax_id.like(pattern.clone()).escape(LIKE_ESCAPE))
                .or(companies::email.like(pattern.clone()).escape(LIKE_ESCAPE))
                .or(companies::phone.like(pattern).escape(LIKE_ESCAPE)),
        );
    }

    items
}

impl CompanyReader for DieselRepository {
    fn get_company_by_id(&self, id: CompanyId) -> RepositoryResult<Option<Company>> {
        let mut conn = self.conn()?;
        companies::table
            .filter(companies::id.eq(id.get()))
            .first::<DbCompany>(&mut conn)
            .optional()?
            .map(|company| Company::try_from(company).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_companies(&self, query: CompanyListQuery) -> RepositoryResult<(usize, Vec<Company>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_companies(&query).count().get_result(&mut conn)?;

        let mut items = filtered_companies(&query).order(companies::name.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let companies = items
            .load::<DbCompany>(&mut conn)?
            .into_iter()
            .map(|company| Company::try_from(company).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, companies))
    }

    fn get_contact_by_id(&self, id: ContactId) -> RepositoryResult<Option<Contact>> {
        let mut conn = self.conn()?;
        contacts::table
            .filter(contacts::id.eq(id.get()))
            .first::<DbContact>(&mut conn)
            .optional()?
            .map(|contact| Contact::try_from(contact).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_company_contacts(&self, company_id: CompanyId) -> RepositoryResult<Vec<Contact>> {
        let mut conn = self.conn()?;
        contacts::table
            .filter(contacts::company_id.eq(company_id.get()))
            .order(contacts::name.asc())
            .load::<DbContact>(&mut conn)?
            .into_iter()
            .map(|contact| Contact::try_from(contact).map_err(RepositoryError::from))
            .collect()
    }
}

impl CompanyWriter for DieselRepository {
    fn upsert_company(&self, company: &CompanyUpsert) -> RepositoryResult<Company> {
        let mut conn = self.conn()?;
        let db_new_company: DbNewCompany = company.into();

        let db_company = diesel::insert_into(companies::table)
            .values(&db_new_company)
            .on_conflict(companies::name_key)
            .do_update()
            .set((
                companies::name.eq(excluded(companies::name)),
                companies::tax_id.eq(coalesce(excluded(companies::tax_id), companies::tax_id)),
                companies::email.eq(coalesce(excluded(companies::email), companies::email)),
                companies::phone.eq(coalesce(excluded(companies::phone), companies::phone)),
                companies::address.eq(coalesce(excluded(companies::address), companies::address)),
                companies::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbCompany>(&mut conn)?;

        Company::try_from(db_company).map_err(RepositoryError::from)
    }

    fn delete_company(&self, id: CompanyId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(companies::table.filter(companies::id.eq(id.get())))
            .execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn upsert_contact(&self, contact: &ContactUpsert) -> RepositoryResult<Contact> {
        let mut conn = self.conn()?;
        let db_new_contact: DbNewContact = contact.into();

        let db_contact = diesel::insert_into(contacts::table)
            .values(&db_new_contact)
            .on_conflict(contacts::dedup_key)
            .do_update()
            .set((
                contacts::name.eq(excluded(contacts::name)),
                contacts::company_id.eq(coalesce_int(
                    excluded(contacts::company_id),
                    contacts::company_id,
                )),
                contacts::email.eq(coalesce(excluded(contacts::email), contacts::email)),
                contacts::phone.eq(coalesce(excluded(contacts::phone), contacts::phone)),
                contacts::position.eq(coalesce(excluded(contacts::position), contacts::position)),
                contacts::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbContact>(&mut conn)?;

        Contact::try_from(db_contact).map_err(RepositoryError::from)
    }

    fn update_contact(&self, id: ContactId, contact: &ContactUpsert) -> RepositoryResult<Contact> {
        let mut conn = self.conn()?;
        let changes: DbNewContact = contact.into();

        let db_contact = diesel::update(contacts::table.filter(contacts::id.eq(id.get())))
            .set((
                contacts::company_id.eq(changes.company_id),
                contacts::name.eq(changes.name),
                contacts::email.eq(changes.email),
                contacts::phone.eq(changes.phone),
                contacts::position.eq(changes.position),
                contacts::dedup_key.eq(&changes.dedup_key),
                contacts::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbContact>(&mut conn)?;

        Contact::try_from(db_contact).map_err(RepositoryError::from)
    }

    fn delete_contact(&self, id: ContactId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(contacts::table.filter(contacts::id.eq(id.get())))
            .execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
