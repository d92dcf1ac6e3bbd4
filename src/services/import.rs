//! Bulk import of products and contacts from uploaded spreadsheets.
//!
//! Rows are written one by one; a failing row is reported and the import
//! moves on to the next one.

use std::collections::HashMap;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::catalog::{Category, NewCategory};
use crate::domain::crm::ContactUpsert;
use crate::domain::types::{CategoryName, Slug};
use crate::domain::user::ADMIN_ROLE;
use crate::dto::import::ImportReport;
use crate::forms::import::{
    ContactRow, ImportUploadForm, ProductRow, RawTable, RowError, parse_contacts, parse_products,
};
use crate::repository::{CategoryWriter, CompanyWriter, ProductWriter};
use crate::services::{ServiceError, ServiceResult, ensure_role};

fn read_upload(form: &ImportUploadForm) -> ServiceResult<RawTable> {
    form.read_table().map_err(|err| {
        log::error!("Failed to read uploaded file: {err}");
        ServiceError::Form(err.to_string())
    })
}

pub fn import_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &ImportUploadForm,
) -> ServiceResult<ImportReport>
where
    R: ProductWriter + CategoryWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;
    let table = read_upload(form)?;
    import_product_table(repo, &table)
}

pub fn import_contacts<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &ImportUploadForm,
) -> ServiceResult<ImportReport>
where
    R: CompanyWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;
    let table = read_upload(form)?;
    import_contact_table(repo, &table)
}

/// Finds or creates the category named in a row, caching by slug.
fn resolve_category<R>(
    repo: &R,
    cache: &mut HashMap<String, Category>,
    name: &str,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    let slug = Slug::from_text(name)?;
    if let Some(category) = cache.get(slug.as_str()) {
        return Ok(category.clone());
    }

    let new_category = NewCategory::new(CategoryName::new(name)?, slug, None);
    let category = repo.get_or_create_category(&new_category)?;
    cache.insert(category.slug.as_str().to_string(), category.clone());
    Ok(category)
}

fn import_product_row<R>(
    repo: &R,
    categories: &mut HashMap<String, Category>,
    row: ProductRow,
) -> ServiceResult<()>
where
    R: ProductWriter + CategoryWriter + ?Sized,
{
    let mut draft = row.draft;
    if let Some(name) = &row.category {
        draft.category_id = Some(resolve_category(repo, categories, name)?.id);
    }

    if draft.sku.is_some() {
        repo.upsert_product_by_sku(&draft)?;
    } else {
        repo.create_product(&draft)?;
    }
    Ok(())
}

/// Imports parsed product rows: upsert by SKU when present, insert otherwise.
pub fn import_product_table<R>(repo: &R, table: &RawTable) -> ServiceResult<ImportReport>
where
    R: ProductWriter + CategoryWriter + ?Sized,
{
    let parsed = parse_products(table).map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut report = ImportReport {
        imported: 0,
        errors: parsed.errors,
    };
    let mut categories = HashMap::new();

    for row in parsed.rows {
        let number = row.row;
        match import_product_row(repo, &mut categories, row) {
            Ok(()) => report.imported += 1,
            Err(err) => {
                log::warn!("Product import failed on row {number}: {err}");
                report.errors.push(RowError {
                    row: number,
                    message: err.to_string(),
                });
            }
        }
    }

    report.errors.sort_by_key(|error| error.row);
    log::info!("Imported {} products", report.imported);
    Ok(report)
}

fn import_contact_row<R>(repo: &R, row: ContactRow) -> ServiceResult<()>
where
    R: CompanyWriter + ?Sized,
{
    let company_id = match &row.company {
        Some(company) => Some(repo.upsert_company(company)?.id),
        None => None,
    };

    let contact = ContactUpsert::new(company_id, row.name, row.email, row.phone, row.position);
    repo.upsert_contact(&contact)?;
    Ok(())
}

/// Imports parsed contact rows through the company and contact upserts.
pub fn import_contact_table<R>(repo: &R, table: &RawTable) -> ServiceResult<ImportReport>
where
    R: CompanyWriter + ?Sized,
{
    let parsed = parse_contacts(table).map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut report = ImportReport {
        imported: 0,
        errors: parsed.errors,
    };

    for row in parsed.rows {
        let number = row.row;
        match import_contact_row(repo, row) {
            Ok(()) => report.imported += 1,
            Err(err) => {
                log::warn!("Contact import failed on row {number}: {err}");
                report.errors.push(RowError {
                    row: number,
                    message: err.to_string(),
                });
            }
        }
    }

    report.errors.sort_by_key(|error| error.row);
    log::info!("Imported {} contacts", report.imported);
    Ok(report)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::CategoryId;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::catalog::tests::{category, product};
    use crate::services::crm::tests::{company, contact};

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
            unreadable: Vec::new(),
        }
    }

    #[test]
    fn products_upsert_by_sku_and_share_categories() {
        let mut repo = MockRepository::new();
        repo.expect_get_or_create_category()
            .withf(|new_category| new_category.slug.as_str() == "herramientas")
            .times(1)
            .returning(|_| Ok(category(6, "Herramientas")));
        repo.expect_upsert_product_by_sku()
            .withf(|draft| draft.category_id.map(CategoryId::get) == Some(6))
            .times(1)
            .returning(|_| Ok(product(1, "Martillo", "5990")));
        repo.expect_create_product()
            .withf(|draft| draft.sku.is_none())
            .times(1)
            .returning(|_| Ok(product(2, "Serrucho", "8990")));

        let report = import_product_table(
            &repo,
            &table(
                &["SKU", "Nombre", "Precio", "Categoría"],
                &[
                    &["M-1", "Martillo", "5.990", "Herramientas"],
                    &["", "Serrucho", "8990", "herramientas"],
                    &["X-9", "", "100", ""],
                ],
            ),
        )
        .unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 4);
    }

    #[test]
    fn failing_row_does_not_stop_the_import() {
        let mut repo = MockRepository::new();
        repo.expect_create_product()
            .withf(|draft| draft.name.as_str() == "Roto")
            .returning(|_| Err(RepositoryError::DatabaseError("locked".to_string())));
        repo.expect_create_product()
            .withf(|draft| draft.name.as_str() == "Sano")
            .returning(|_| Ok(product(3, "Sano", "10")));

        let report = import_product_table(
            &repo,
            &table(&["name", "price"], &[&["Roto", "1"], &["Sano", "10"]]),
        )
        .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.errors[0].row, 2);
    }

    #[test]
    fn missing_price_column_rejects_file() {
        let repo = MockRepository::new();
        let result = import_product_table(&repo, &table(&["nombre"], &[&["Martillo"]]));
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn contacts_are_linked_to_upserted_company() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_company()
            .withf(|upsert| upsert.name.as_str() == "Comercial Andes")
            .times(1)
            .returning(|_| Ok(company(8, "Comercial Andes")));
        repo.expect_upsert_contact()
            .withf(|upsert| upsert.company_id.map(|id| id.get()) == Some(8))
            .times(1)
            .returning(|_| Ok(contact(1, Some(8), "María")));

        let report = import_contact_table(
            &repo,
            &table(
                &["Empresa", "Nombre", "Correo"],
                &[&["Comercial Andes", "María", "maria@andes.cl"]],
            ),
        )
        .unwrap();

        assert_eq!(report.imported, 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn import_requires_admin() {
        use crate::services::test_support::seller;
        let repo = MockRepository::new();
        let form = ImportUploadForm {
            file: actix_multipart::form::tempfile::TempFile {
                file: tempfile::NamedTempFile::new().unwrap(),
                content_type: None,
                file_name: Some("p.csv".to_string()),
                size: 0,
            },
        };
        assert!(matches!(
            import_products(&repo, &seller(), &form),
            Err(ServiceError::Unauthorized)
        ));
    }
}
