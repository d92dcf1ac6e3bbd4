//! Back-office user administration.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{Email, UserId, UserName};
use crate::domain::user::{ADMIN_ROLE, NewUser, User, UserRole};
use crate::dto::users::UsersPageData;
use crate::forms::users::{AddUserForm, AddUserPayload, MIN_PASSWORD_LEN, ResetPasswordForm};
use crate::repository::{UserReader, UserWriter};
use crate::services::auth::hash_password;
use crate::services::{ServiceError, ServiceResult, ensure_role};

pub fn list_users<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<UsersPageData>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let users = repo.list_users().map_err(|err| {
        log::error!("Failed to list users: {err}");
        err
    })?;

    Ok(UsersPageData {
        users,
        current_user_id: user.user_id(),
    })
}

pub fn add_user<R>(repo: &R, user: &AuthenticatedUser, form: AddUserForm) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let payload = AddUserPayload::try_from(form)?;

    if repo.get_user_by_email(&payload.email)?.is_some() {
        return Err(ServiceError::Form(
            "Ya existe un usuario con ese correo".to_string(),
        ));
    }

    let new_user = NewUser::new(
        payload.email,
        payload.name,
        hash_password(&payload.password)?,
        payload.role,
    );

    let created = repo.create_user(&new_user).map_err(|err| {
        log::error!("Failed to create user: {err}");
        err
    })?;

    Ok(created)
}

/// Activates or deactivates an account. Admins cannot deactivate themselves.
pub fn set_user_active<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: i32,
    is_active: bool,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let user_id = UserId::new(user_id)?;
    if !is_active && user.user_id() == Some(user_id.get()) {
        return Err(ServiceError::Form(
            "No puede desactivar su propia cuenta".to_string(),
        ));
    }

    repo.get_user_by_id(user_id)?
        .ok_or(ServiceError::NotFound)?;

    let updated = repo.set_user_active(user_id, is_active).map_err(|err| {
        log::error!("Failed to update user {user_id}: {err}");
        err
    })?;

    Ok(updated)
}

pub fn reset_password<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: i32,
    form: ResetPasswordForm,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let user_id = UserId::new(user_id)?;
    let password = form.into_password()?;

    repo.get_user_by_id(user_id)?
        .ok_or(ServiceError::NotFound)?;

    repo.set_user_password(user_id, &hash_password(&password)?)
        .map_err(|err| {
            log::error!("Failed to reset password for user {user_id}: {err}");
            err
        })?;

    Ok(())
}

/// Creates the admin account or, when the email exists, resets its password
/// and reactivates it. Used by the `create_admin` binary.
pub fn ensure_admin_user<R>(
    repo: &R,
    email: &str,
    name: &str,
    password: &str,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let email = Email::new(email)?;
    let name = UserName::new(name)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Form(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let password_hash = hash_password(password)?;

    match repo.get_user_by_email(&email)? {
        Some(existing) if existing.role != UserRole::Admin => Err(ServiceError::Conflict(format!(
            "{email} already exists with role {}",
            existing.role
        ))),
        Some(existing) => {
            repo.set_user_password(existing.id, &password_hash)?;
            Ok(repo.set_user_active(existing.id, true)?)
        }
        None => Ok(repo.create_user(&NewUser::new(
            email,
            name,
            password_hash,
            UserRole::Admin,
        ))?),
    }
}
