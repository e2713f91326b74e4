use crate::feed::{self, Pager};
use crate::global;
use crate::index::PageQuery;
use crate::init::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{groups, posts};
use crate::post::{feed_query, PostForTemplate};
use actix_web::{error, get, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::{entity::*, query::*};

#[derive(Template)]
#[template(path = "group.html")]
pub struct GroupTemplate {
    pub client: ClientCtx,
    pub group: groups::Model,
    pub posts: Vec<PostForTemplate>,
    pub pager: Pager,
}

#[get("/groups/{slug}")]
pub async fn view_group(
    client: ClientCtx,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let slug = path.into_inner();

    let group = groups::Entity::find()
        .filter(groups::Column::Slug.eq(slug.as_str()))
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Group not found."))?;

    let per_page = global::get_posts_per_page();
    let feed = feed::assemble(
        feed_query()
            .filter(posts::Column::GroupId.eq(group.id))
            .into_model::<PostForTemplate>()
            .paginate(db, per_page),
        per_page,
        query.page,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    Ok(GroupTemplate {
        pager: Pager::new(&format!("/groups/{}", group.slug), &feed),
        client,
        group,
        posts: feed.items,
    }
    .to_response())
}
