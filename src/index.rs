use crate::cache::FeedCache;
use crate::feed::{self, Pager};
use crate::global;
use crate::init::get_db_pool;
use crate::login::redirect_to_login;
use crate::middleware::ClientCtx;
use crate::orm::{follows, posts};
use crate::post::{feed_query, PostForTemplate};
use actix_web::{error, get, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::sea_query::Query;
use sea_orm::{entity::*, query::*};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub client: ClientCtx,
    pub posts: Vec<PostForTemplate>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "feed.html")]
pub struct FeedTemplate {
    pub client: ClientCtx,
    pub posts: Vec<PostForTemplate>,
    pub pager: Pager,
}

fn html_response(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn cache_key(page: usize) -> String {
    format!("index:page:{}", page)
}

/// Missing and zero page numbers read the same entry as page 1.
fn requested_cache_key(requested: Option<usize>) -> String {
    match requested {
        None | Some(0) => cache_key(1),
        Some(page) => cache_key(page),
    }
}

/// Global feed. Rendered output is cached per page; reads inside the TTL
/// window may be stale, including after deletions.
#[get("/")]
pub async fn view_index(
    client: ClientCtx,
    cache: web::Data<FeedCache>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    if let Some(body) = cache.get(&requested_cache_key(query.page)) {
        return Ok(html_response(body));
    }

    let per_page = global::get_posts_per_page();
    let feed = feed::assemble(
        feed_query()
            .into_model::<PostForTemplate>()
            .paginate(get_db_pool(), per_page),
        per_page,
        query.page,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    // Stored under the clamped page, so every out-of-range request shares
    // one entry with the page it actually rendered.
    let key = cache_key(feed.page);
    let body = IndexTemplate {
        pager: Pager::new("/", &feed),
        client,
        posts: feed.items,
    }
    .render()
    .map_err(|_| error::ErrorInternalServerError("Template parsing error"))?;

    cache.put(key, body.clone());
    Ok(html_response(body))
}

/// Personalized feed: posts by authors the viewer follows, resolved with an
/// explicit subquery on the follow edges.
#[get("/feed")]
pub async fn view_feed(
    client: ClientCtx,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let viewer_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(redirect_to_login()),
    };

    let followed_authors = Query::select()
        .column(follows::Column::AuthorId)
        .from(follows::Entity)
        .and_where(follows::Column::UserId.eq(viewer_id))
        .to_owned();

    let per_page = global::get_posts_per_page();
    let feed = feed::assemble(
        feed_query()
            .filter(posts::Column::UserId.in_subquery(followed_authors))
            .into_model::<PostForTemplate>()
            .paginate(get_db_pool(), per_page),
        per_page,
        query.page,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    Ok(FeedTemplate {
        pager: Pager::new("/feed", &feed),
        client,
        posts: feed.items,
    }
    .to_response())
}

/// Administrative/test hook for dropping the rendered global feed early.
#[get("/tasks/expire-feed-cache")]
pub async fn view_task_expire_feed_cache(
    cache: web::Data<FeedCache>,
) -> Result<HttpResponse, Error> {
    cache.invalidate();
    Ok(HttpResponse::Found()
        .append_header(("Location", "/"))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_reads_normalize_the_requested_page() {
        assert_eq!(requested_cache_key(None), "index:page:1");
        assert_eq!(requested_cache_key(Some(0)), "index:page:1");
        assert_eq!(requested_cache_key(Some(3)), "index:page:3");
        assert_eq!(requested_cache_key(Some(3)), cache_key(3));
    }
}
