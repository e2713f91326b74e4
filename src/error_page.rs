use crate::middleware::ClientCtx;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, header::HeaderValue, StatusCode};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::Result;
use askama_actix::Template;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    client: ClientCtx,
    status: StatusCode,
    detail: String,
}

pub fn render_404<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(res, "The page you asked for does not exist.")
}

pub fn render_500<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(res, "Something broke on our side. Try again in a moment.")
}

/// Replaces the empty default response body with a full HTML document.
fn render_error<B>(res: ServiceResponse<B>, fallback: &str) -> Result<ErrorHandlerResponse<B>> {
    let detail = match res.response().error() {
        Some(err) => err.to_string(),
        None => fallback.to_owned(),
    };
    let page = ErrorTemplate {
        client: ClientCtx::default(),
        status: res.status(),
        detail,
    }
    .to_string();

    let mut res = res.map_body(|_, _| EitherBody::<B, BoxBody>::right(BoxBody::new(page)));
    let headers = res.response_mut().headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
    // Intermediary caches must not hold on to error pages.
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(ErrorHandlerResponse::Response(res))
}
