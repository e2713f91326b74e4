use crate::init::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::users;
use crate::session::start_client_session;
use actix_session::Session;
use actix_web::{get, post, web, Error, HttpResponse};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use askama_actix::{Template, TemplateToResponse};
use chrono::Utc;
use sea_orm::entity::*;
use serde::Deserialize;

#[derive(Template)]
#[template(path = "create_user.html")]
pub struct CreateUserTemplate {
    pub client: ClientCtx,
    pub error: Option<&'static str>,
}

#[derive(Deserialize)]
pub struct CreateUserFormData {
    pub username: String,
    pub password: String,
}

#[get("/create_user")]
pub async fn create_user_get(client: ClientCtx) -> HttpResponse {
    CreateUserTemplate {
        client,
        error: None,
    }
    .to_response()
}

#[post("/create_user")]
pub async fn create_user_post(
    client: ClientCtx,
    cookies: Session,
    form: web::Form<CreateUserFormData>,
) -> Result<HttpResponse, Error> {
    let name = form.username.trim();
    if name.is_empty() || form.password.is_empty() {
        return Ok(CreateUserTemplate {
            client,
            error: Some("Username and password are required."),
        }
        .to_response());
    }

    let password_hash = match Argon2::default()
        .hash_password(form.password.as_bytes(), &SaltString::generate(&mut OsRng))
    {
        Ok(hash) => hash.to_string(),
        Err(e) => {
            log::error!("create_user_post: hash_password: {}", e);
            return Err(actix_web::error::ErrorInternalServerError(
                "Could not create user.",
            ));
        }
    };

    let user = users::ActiveModel {
        created_at: Set(Utc::now().naive_utc()),
        name: Set(name.to_owned()),
        password: Set(password_hash),
        ..Default::default()
    }
    .insert(get_db_pool())
    .await;

    match user {
        Ok(user) => {
            start_client_session(&cookies, user.id)?;
            Ok(HttpResponse::Found()
                .append_header(("Location", "/"))
                .finish())
        }
        // The unique index on users.name rejects duplicates.
        Err(e) => {
            log::warn!("create_user_post: insert: {}", e);
            Ok(CreateUserTemplate {
                client,
                error: Some("That username is taken."),
            }
            .to_response())
        }
    }
}
