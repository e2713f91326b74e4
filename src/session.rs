use crate::init::get_db_pool;
use crate::orm::users;
use crate::user::ClientUser;
use actix_session::Session;
use sea_orm::{entity::*, query::*};

const SESSION_USER_KEY: &str = "uid";

/// Resolves the cookie session to a user, if one is signed in.
pub async fn authenticate_client_by_session(cookies: &Session) -> Option<ClientUser> {
    let id = match cookies.get::<i32>(SESSION_USER_KEY) {
        Ok(Some(id)) => id,
        Ok(None) => return None,
        Err(e) => {
            log::error!("authenticate_client_by_session: cookies.get(): {}", e);
            return None;
        }
    };

    match users::Entity::find_by_id(id)
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Name)
        .into_model::<ClientUser>()
        .one(get_db_pool())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            log::error!("authenticate_client_by_session: DbErr: {}", e);
            None
        }
    }
}

/// Marks the cookie session as belonging to the given user.
pub fn start_client_session(cookies: &Session, user_id: i32) -> Result<(), actix_web::Error> {
    cookies
        .insert(SESSION_USER_KEY, user_id)
        .map_err(actix_web::Error::from)
}

pub fn end_client_session(cookies: &Session) {
    cookies.purge();
}
