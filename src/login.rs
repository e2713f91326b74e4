use crate::init::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::users;
use crate::session::start_client_session;
use actix_session::Session;
use actix_web::{error, get, post, web, Error, HttpResponse};
use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use askama_actix::{Template, TemplateToResponse};
use sea_orm::{entity::*, query::*};
use serde::Deserialize;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub client: ClientCtx,
    pub error: Option<&'static str>,
}

/// Where every guarded handler sends guests.
pub fn redirect_to_login() -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", "/login"))
        .finish()
}

#[derive(Deserialize)]
pub struct LoginFormData {
    pub username: String,
    pub password: String,
}

#[get("/login")]
pub async fn view_login(client: ClientCtx) -> HttpResponse {
    LoginTemplate {
        client,
        error: None,
    }
    .to_response()
}

#[post("/login")]
pub async fn post_login(
    client: ClientCtx,
    cookies: Session,
    form: web::Form<LoginFormData>,
) -> Result<HttpResponse, Error> {
    let user = users::Entity::find()
        .filter(users::Column::Name.eq(form.username.as_str()))
        .one(get_db_pool())
        .await
        .map_err(error::ErrorInternalServerError)?;

    if let Some(user) = user {
        let verified = match PasswordHash::new(&user.password) {
            Ok(hash) => Argon2::default()
                .verify_password(form.password.as_bytes(), &hash)
                .is_ok(),
            Err(e) => {
                log::error!("post_login: bad password hash for {}: {}", user.name, e);
                false
            }
        };
        if verified {
            start_client_session(&cookies, user.id)?;
            return Ok(HttpResponse::Found()
                .append_header(("Location", "/"))
                .finish());
        }
    }

    Ok(LoginTemplate {
        client,
        error: Some("Invalid username or password."),
    }
    .to_response())
}
