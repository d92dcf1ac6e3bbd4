//! Companies (empresas) and contacts (contactos).

use crate::domain::auth::AuthenticatedUser;
use crate::domain::crm::{Company, CompanyUpsert, Contact, ContactUpsert};
use crate::domain::types::{CompanyId, ContactId};
use crate::domain::user::{ADMIN_ROLE, SELLER_ROLE};
use crate::dto::crm::{CompaniesPageData, CompaniesQuery, CompanyPageData, ContactPageData};
use crate::forms::crm::{CompanyForm, ContactForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    CompanyListQuery, CompanyReader, CompanyWriter, QuoteListQuery, QuoteReader,
};
use crate::services::catalog::search_term;
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Quotes shown on a company's detail page.
const COMPANY_QUOTES: usize = 50;

pub fn list_companies<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: CompaniesQuery,
) -> ServiceResult<CompaniesPageData>
where
    R: CompanyReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let page = query.page.unwrap_or(1);
    let mut list_query = CompanyListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    let search_query = search_term(query.search);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    let (total, companies) = repo.list_companies(list_query).map_err(|err| {
        log::error!("Failed to list companies: {err}");
        err
    })?;

    Ok(CompaniesPageData {
        companies: Paginated::from_total(companies, page, total, DEFAULT_ITEMS_PER_PAGE),
        search_query,
    })
}

pub fn show_company<R>(
    repo: &R,
    user: &AuthenticatedUser,
    company_id: i32,
) -> ServiceResult<CompanyPageData>
where
    R: CompanyReader + QuoteReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let company_id = CompanyId::new(company_id)?;
    let company = repo
        .get_company_by_id(company_id)?
        .ok_or(ServiceError::NotFound)?;
    let contacts = repo.list_company_contacts(company_id)?;
    let (_, quotes) = repo.list_quotes(
        QuoteListQuery::new()
            .company(company_id)
            .paginate(1, COMPANY_QUOTES),
    )?;

    Ok(CompanyPageData {
        company,
        contacts,
        quotes,
    })
}

/// Creates the company or merges the form into the one with the same name.
pub fn save_company<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CompanyForm,
) -> ServiceResult<Company>
where
    R: CompanyWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let upsert = CompanyUpsert::try_from(form)?;

    repo.upsert_company(&upsert).map_err(|err| {
        log::error!("Failed to save company {}: {err}", upsert.name);
        err.into()
    })
}

/// Deletes a company. Its contacts remain without a company and its quotes
/// keep their customer snapshot.
pub fn delete_company<R>(repo: &R, user: &AuthenticatedUser, company_id: i32) -> ServiceResult<()>
where
    R: CompanyWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let company_id = CompanyId::new(company_id)?;
    repo.delete_company(company_id).map_err(|err| {
        log::error!("Failed to delete company {company_id}: {err}");
        err
    })?;

    Ok(())
}

fn ensure_company_exists<R>(repo: &R, upsert: &ContactUpsert) -> ServiceResult<()>
where
    R: CompanyReader + ?Sized,
{
    if let Some(company_id) = upsert.company_id
        && repo.get_company_by_id(company_id)?.is_none()
    {
        return Err(ServiceError::Form("La empresa no existe".to_string()));
    }
    Ok(())
}

pub fn load_contact<R>(
    repo: &R,
    user: &AuthenticatedUser,
    contact_id: i32,
) -> ServiceResult<ContactPageData>
where
    R: CompanyReader + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let contact = repo
        .get_contact_by_id(ContactId::new(contact_id)?)?
        .ok_or(ServiceError::NotFound)?;
    let company = match contact.company_id {
        Some(id) => repo.get_company_by_id(id)?,
        None => None,
    };

    Ok(ContactPageData { contact, company })
}

/// Creates a contact or merges it into the one with the same dedup key.
pub fn save_contact<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ContactForm,
) -> ServiceResult<Contact>
where
    R: CompanyReader + CompanyWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let upsert = ContactUpsert::try_from(form)?;
    ensure_company_exists(repo, &upsert)?;

    repo.upsert_contact(&upsert).map_err(|err| {
        log::error!("Failed to save contact {}: {err}", upsert.name);
        err.into()
    })
}

pub fn update_contact<R>(
    repo: &R,
    user: &AuthenticatedUser,
    contact_id: i32,
    form: ContactForm,
) -> ServiceResult<Contact>
where
    R: CompanyReader + CompanyWriter + ?Sized,
{
    ensure_role(user, SELLER_ROLE)?;

    let contact_id = ContactId::new(contact_id)?;
    let upsert = ContactUpsert::try_from(form)?;

    repo.get_contact_by_id(contact_id)?
        .ok_or(ServiceError::NotFound)?;
    ensure_company_exists(repo, &upsert)?;

    repo.update_contact(contact_id, &upsert).map_err(|err| match ServiceError::from(err) {
        ServiceError::Conflict(_) => ServiceError::Form(
            "Ya existe otro contacto con ese correo o nombre".to_string(),
        ),
        other => {
            log::error!("Failed to update contact {contact_id}: {other}");
            other
        }
    })
}

pub fn delete_contact<R>(repo: &R, user: &AuthenticatedUser, contact_id: i32) -> ServiceResult<()>
where
    R: CompanyWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let contact_id = ContactId::new(contact_id)?;
    repo.delete_contact(contact_id).map_err(|err| {
        log::error!("Failed to delete contact {contact_id}: {err}");
        err
    })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::{CompanyName, ContactName};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{admin, seller};

    pub(crate) fn company(id: i32, name: &str) -> Company {
        let now = Utc::now().naive_utc();
        Company {
            id: CompanyId::new(id).unwrap(),
            name: CompanyName::new(name).unwrap(),
            tax_id: None,
            email: None,
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn contact(id: i32, company_id: Option<i32>, name: &str) -> Contact {
        let now = Utc::now().naive_utc();
        Contact {
            id: ContactId::new(id).unwrap(),
            company_id: company_id.map(|id| CompanyId::new(id).unwrap()),
            name: ContactName::new(name).unwrap(),
            email: None,
            phone: None,
            position: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn contact_form(company_id: Option<&str>) -> ContactForm {
        ContactForm {
            company_id: company_id.map(str::to_string),
            name: "Juan Soto".to_string(),
            email: None,
            phone: Some("+56 9 1234 5678".to_string()),
            position: None,
        }
    }

    #[test]
    fn company_detail_includes_contacts_and_quotes() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id()
            .returning(|id| Ok(Some(company(id.get(), "Comercial Andes"))));
        repo.expect_list_company_contacts()
            .returning(|id| Ok(vec![contact(1, Some(id.get()), "Ana")]));
        repo.expect_list_quotes()
            .withf(|query| query.company_id.map(CompanyId::get) == Some(7))
            .returning(|_| Ok((0, vec![])));

        let data = show_company(&repo, &seller(), 7).unwrap();
        assert_eq!(data.company.id.get(), 7);
        assert_eq!(data.contacts.len(), 1);
    }

    #[test]
    fn save_company_goes_through_upsert() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_company()
            .withf(|upsert| upsert.name_key() == "comercial andes")
            .times(1)
            .returning(|_| Ok(company(3, "Comercial Andes")));

        let form = CompanyForm {
            name: "  COMERCIAL  Andes".to_string(),
            tax_id: None,
            email: None,
            phone: None,
            address: None,
        };
        let saved = save_company(&repo, &seller(), form).unwrap();
        assert_eq!(saved.id.get(), 3);
    }

    #[test]
    fn contact_for_missing_company_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id().returning(|_| Ok(None));
        repo.expect_upsert_contact().times(0);

        let result = save_contact(&repo, &seller(), contact_form(Some("12")));
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn standalone_contact_is_saved() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_contact()
            .withf(|upsert| upsert.company_id.is_none() && upsert.dedup_key() == "name:0:juan soto")
            .times(1)
            .returning(|_| Ok(contact(5, None, "Juan Soto")));

        save_contact(&repo, &seller(), contact_form(None)).unwrap();
    }

    #[test]
    fn deletes_require_admin() {
        let mut repo = MockRepository::new();
        repo.expect_delete_company().times(0);
        repo.expect_delete_contact().times(0);
        assert!(matches!(
            delete_company(&repo, &seller(), 1),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            delete_contact(&repo, &seller(), 1),
            Err(ServiceError::Unauthorized)
        ));

        let mut repo = MockRepository::new();
        repo.expect_delete_company().times(1).returning(|_| Ok(()));
        delete_company(&repo, &admin(), 1).unwrap();
    }
}
