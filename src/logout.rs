use crate::session::end_client_session;
use actix_session::Session;
use actix_web::{get, HttpResponse};

#[get("/logout")]
pub async fn view_logout(cookies: Session) -> HttpResponse {
    end_client_session(&cookies);
    HttpResponse::Found()
        .append_header(("Location", "/"))
        .finish()
}
