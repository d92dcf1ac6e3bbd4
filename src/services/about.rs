//! The public "About us" page and its editor.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::content::AboutPage;
use crate::domain::user::ADMIN_ROLE;
use crate::forms::content::AboutForm;
use crate::repository::{ContentReader, ContentWriter};
use crate::services::{ServiceResult, ensure_role};

/// Public page content; an empty default when nothing was saved yet.
pub fn load_about<R>(repo: &R) -> ServiceResult<AboutPage>
where
    R: ContentReader + ?Sized,
{
    let page = repo.get_about_page().map_err(|err| {
        log::error!("Failed to load about page: {err}");
        err
    })?;
    Ok(page.unwrap_or_default())
}

pub fn load_about_editor<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<AboutPage>
where
    R: ContentReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;
    load_about(repo)
}

pub fn save_about<R>(repo: &R, user: &AuthenticatedUser, form: AboutForm) -> ServiceResult<AboutPage>
where
    R: ContentWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let page = AboutPage::from(form);

    let saved = repo.save_about_page(&page).map_err(|err| {
        log::error!("Failed to save about page: {err}");
        err
    })?;

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::content::{BusinessSettings, DEFAULT_ABOUT_TITLE};
    use crate::repository::errors::RepositoryResult;
    use crate::services::ServiceError;
    use crate::services::test_support::{admin, seller};

    #[derive(Default)]
    struct MockRepo {
        stored: RefCell<Option<AboutPage>>,
    }

    impl ContentReader for MockRepo {
        fn get_about_page(&self) -> RepositoryResult<Option<AboutPage>> {
            Ok(self.stored.borrow().clone())
        }

        fn get_settings(&self) -> RepositoryResult<Option<BusinessSettings>> {
            Ok(None)
        }
    }

    impl ContentWriter for MockRepo {
        fn save_about_page(&self, page: &AboutPage) -> RepositoryResult<AboutPage> {
            self.stored.replace(Some(page.clone()));
            Ok(page.clone())
        }

        fn save_settings(&self, settings: &BusinessSettings) -> RepositoryResult<BusinessSettings> {
            Ok(settings.clone())
        }
    }

    #[test]
    fn empty_store_returns_default_page() {
        let repo = MockRepo::default();

        let page = load_about(&repo).unwrap();

        assert_eq!(page.title, DEFAULT_ABOUT_TITLE);
        assert!(page.body.is_empty());
    }

    #[test]
    fn seller_cannot_edit() {
        let repo = MockRepo::default();
        let form = AboutForm {
            title: "Nosotros".to_string(),
            body: "Hola".to_string(),
        };

        assert!(matches!(
            save_about(&repo, &seller(), form),
            Err(ServiceError::Unauthorized)
        ));
        assert!(repo.stored.borrow().is_none());
    }

    #[test]
    fn saved_body_is_sanitized() {
        let repo = MockRepo::default();
        let form = AboutForm {
            title: "Quiénes somos".to_string(),
            body: "<p onclick=\"x()\">Desde 1998</p>".to_string(),
        };

        save_about(&repo, &admin(), form).unwrap();

        let stored = load_about(&repo).unwrap();
        assert_eq!(stored.title, "Quiénes somos");
        assert_eq!(stored.body, "<p>Desde 1998</p>");
    }
}
