//! Repository implementation for the singleton content rows.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::content::{AboutPage, BusinessSettings};
use crate::models::content::{
    AboutPage as DbAboutPage, BusinessSettings as DbBusinessSettings, SINGLETON_ID,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ContentReader, ContentWriter, DieselRepository};
use crate::schema::{about_page, business_settings};

impl ContentReader for DieselRepository {
    fn get_about_page(&self) -> RepositoryResult<Option<AboutPage>> {
        let mut conn = self.conn()?;
        let page = about_page::table
            .filter(about_page::id.eq(SINGLETON_ID))
            .first::<DbAboutPage>(&mut conn)
            .optional()?;

        Ok(page.map(AboutPage::from))
    }

    fn get_settings(&self) -> RepositoryResult<Option<BusinessSettings>> {
        let mut conn = self.conn()?;
        business_settings::table
            .filter(business_settings::id.eq(SINGLETON_ID))
            .first::<DbBusinessSettings>(&mut conn)
            .optional()?
            .map(|settings| BusinessSettings::try_from(settings).map_err(RepositoryError::from))
            .transpose()
    }
}

impl ContentWriter for DieselRepository {
    fn save_about_page(&self, page: &AboutPage) -> RepositoryResult<AboutPage> {
        let mut conn = self.conn()?;
        let row = DbAboutPage::from_domain(page, Utc::now().naive_utc());

        let saved = diesel::insert_into(about_page::table)
            .values(&row)
            .on_conflict(about_page::id)
            .do_update()
            .set(&row)
            .get_result::<DbAboutPage>(&mut conn)?;

        Ok(saved.into())
    }

    fn save_settings(&self, settings: &BusinessSettings) -> RepositoryResult<BusinessSettings> {
        let mut conn = self.conn()?;
        let row = DbBusinessSettings::from(settings);

        let saved = diesel::insert_into(business_settings::table)
            .values(&row)
            .on_conflict(business_settings::id)
            .do_update()
            .set(&row)
            .get_result::<DbBusinessSettings>(&mut conn)?;

        BusinessSettings::try_from(saved).map_err(RepositoryError::from)
    }
}
