use crate::middleware::ClientCtx;
use actix_web::{get, HttpResponse};
use askama_actix::{Template, TemplateToResponse};

#[derive(Template)]
#[template(path = "about_author.html")]
pub struct AboutAuthorTemplate {
    pub client: ClientCtx,
}

#[derive(Template)]
#[template(path = "about_tech.html")]
pub struct AboutTechTemplate {
    pub client: ClientCtx,
}

#[get("/about/author")]
pub async fn view_about_author(client: ClientCtx) -> HttpResponse {
    AboutAuthorTemplate { client }.to_response()
}

#[get("/about/tech")]
pub async fn view_about_tech(client: ClientCtx) -> HttpResponse {
    AboutTechTemplate { client }.to_response()
}
