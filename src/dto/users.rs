use crate::domain::user::User;

pub struct UsersPageData {
    pub users: Vec<User>,
    /// Id of the signed-in admin, whose row cannot be deactivated.
    pub current_user_id: Option<i32>,
}
