//! Business settings used on quotations.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::content::BusinessSettings;
use crate::domain::user::ADMIN_ROLE;
use crate::forms::content::SettingsForm;
use crate::repository::{ContentReader, ContentWriter};
use crate::services::{ServiceResult, ensure_role};

/// Stored settings, or the defaults when none were saved yet.
pub fn current_settings<R>(repo: &R) -> ServiceResult<BusinessSettings>
where
    R: ContentReader + ?Sized,
{
    let settings = repo.get_settings().map_err(|err| {
        log::error!("Failed to load settings: {err}");
        err
    })?;
    Ok(settings.unwrap_or_default())
}

pub fn load_settings<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<BusinessSettings>
where
    R: ContentReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;
    current_settings(repo)
}

pub fn save_settings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SettingsForm,
) -> ServiceResult<BusinessSettings>
where
    R: ContentWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let settings = BusinessSettings::try_from(form)?;

    let saved = repo.save_settings(&settings).map_err(|err| {
        log::error!("Failed to save settings: {err}");
        err
    })?;

    Ok(saved)
}
