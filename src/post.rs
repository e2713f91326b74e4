use crate::comment::{get_comments_for_template, CommentForTemplate};
use crate::init::get_db_pool;
use crate::login::redirect_to_login;
use crate::middleware::ClientCtx;
use crate::orm::{groups, posts, users};
use crate::url::UrlToken;
use actix_web::{error, get, post, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use chrono::prelude::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult, Select};
use serde::Deserialize;

/// A fully joined struct representing the post model and its relational data.
#[derive(Debug, FromQueryResult)]
pub struct PostForTemplate {
    pub id: i32,
    pub text: String,
    pub created_at: chrono::NaiveDateTime,
    pub user_id: i32,
    pub group_id: Option<i32>,
    pub image: Option<String>,
    // join users
    pub username: Option<String>,
    // join groups
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

impl PostForTemplate {
    pub fn author_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Guest")
    }

    pub fn author_link(&self) -> String {
        UrlToken {
            slug: self.username.as_deref(),
            name: self.author_name(),
            base_url: "members",
            class: "username",
        }
        .to_string()
    }

    pub fn group_link(&self) -> String {
        UrlToken {
            slug: self.group_slug.as_deref(),
            name: self.group_title.as_deref().unwrap_or("no group"),
            base_url: "groups",
            class: "group",
        }
        .to_string()
    }
}

/// Base selection for every post feed: author and group adjoined, newest
/// first, id as the stable tie-break under equal timestamps.
pub fn feed_query() -> Select<posts::Entity> {
    posts::Entity::find()
        .left_join(users::Entity)
        .column_as(users::Column::Name, "username")
        .left_join(groups::Entity)
        .column_as(groups::Column::Title, "group_title")
        .column_as(groups::Column::Slug, "group_slug")
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
}

/// Returns the result of a query selecting for a post by id with adjoined templating data.
pub async fn get_post_for_template(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<PostForTemplate>, DbErr> {
    feed_query()
        .filter(posts::Column::Id.eq(id))
        .into_model::<PostForTemplate>()
        .one(db)
        .await
}

pub async fn count_posts_by(db: &DatabaseConnection, user_id: i32) -> Result<usize, DbErr> {
    posts::Entity::find()
        .filter(posts::Column::UserId.eq(user_id))
        .paginate(db, 1)
        .num_items()
        .await
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub client: ClientCtx,
    pub post: PostForTemplate,
    pub comments: Vec<CommentForTemplate>,
    pub posts_count: usize,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub client: ClientCtx,
    pub action: String,
    pub is_edit: bool,
    pub error: Option<&'static str>,
    pub text: String,
    pub image: String,
    pub groups: Vec<GroupOption>,
}

/// Precomputed <select> entry. Keeps the template free of Option compares.
pub struct GroupOption {
    pub id: i32,
    pub title: String,
    pub selected: bool,
}

fn group_options(groups: Vec<groups::Model>, selected: Option<i32>) -> Vec<GroupOption> {
    groups
        .into_iter()
        .map(|group| GroupOption {
            selected: selected == Some(group.id),
            id: group.id,
            title: group.title,
        })
        .collect()
}

#[derive(Deserialize)]
pub struct PostFormData {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
}

impl PostFormData {
    /// The group <select> posts an empty string when no group is chosen.
    fn group_id(&self) -> Option<i32> {
        self.group.as_deref().and_then(|s| s.parse().ok())
    }

    fn image_value(&self) -> Option<String> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
    }
}

fn redirect_to_post(id: i32) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", format!("/posts/{}", id)))
        .finish()
}

#[get("/posts/{post_id}")]
pub async fn view_post(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let id = path.into_inner();

    let post = get_post_for_template(db, id)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;
    let comments = get_comments_for_template(db, id)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let posts_count = count_posts_by(db, post.user_id)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostDetailTemplate {
        can_edit: client.can_update_post(&post),
        client,
        post,
        comments,
        posts_count,
    }
    .to_response())
}

#[get("/posts/create")]
pub async fn create_post_get(client: ClientCtx) -> Result<HttpResponse, Error> {
    if !client.can_create_post() {
        return Ok(redirect_to_login());
    }

    let groups = groups::Entity::find()
        .all(get_db_pool())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostFormTemplate {
        client,
        action: "/posts/create".to_owned(),
        is_edit: false,
        error: None,
        text: String::new(),
        image: String::new(),
        groups: group_options(groups, None),
    }
    .to_response())
}

#[post("/posts/create")]
pub async fn create_post_post(
    client: ClientCtx,
    form: web::Form<PostFormData>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(redirect_to_login()),
    };
    let db = get_db_pool();
    let form = form.into_inner();

    if form.text.trim().is_empty() {
        let groups = groups::Entity::find()
            .all(db)
            .await
            .map_err(error::ErrorInternalServerError)?;
        return Ok(PostFormTemplate {
            client,
            action: "/posts/create".to_owned(),
            is_edit: false,
            error: Some("Post text cannot be empty."),
            text: form.text,
            image: form.image.unwrap_or_default(),
            groups: group_options(groups, form.group.as_deref().and_then(|s| s.parse().ok())),
        }
        .to_response());
    }

    posts::ActiveModel {
        text: Set(form.text.trim().to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        user_id: Set(user_id),
        group_id: Set(form.group_id()),
        image: Set(form.image_value()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Found()
        .append_header(("Location", format!("/members/{}", client.get_name())))
        .finish())
}

#[get("/posts/{post_id}/edit")]
pub async fn edit_post(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(redirect_to_login());
    }
    let db = get_db_pool();
    let id = path.into_inner();

    let post = get_post_for_template(db, id)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    // Non-authors land on the read-only view, not an error page.
    if !client.can_update_post(&post) {
        return Ok(redirect_to_post(id));
    }

    let groups = groups::Entity::find()
        .all(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(PostFormTemplate {
        client,
        action: format!("/posts/{}/edit", id),
        is_edit: true,
        error: None,
        text: post.text,
        image: post.image.unwrap_or_default(),
        groups: group_options(groups, post.group_id),
    }
    .to_response())
}

#[post("/posts/{post_id}/edit")]
pub async fn update_post(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Form<PostFormData>,
) -> Result<HttpResponse, Error> {
    if !client.is_user() {
        return Ok(redirect_to_login());
    }
    let db = get_db_pool();
    let id = path.into_inner();
    let form = form.into_inner();

    let post = get_post_for_template(db, id)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    if !client.can_update_post(&post) {
        return Ok(redirect_to_post(id));
    }

    if form.text.trim().is_empty() {
        let groups = groups::Entity::find()
            .all(db)
            .await
            .map_err(error::ErrorInternalServerError)?;
        return Ok(PostFormTemplate {
            client,
            action: format!("/posts/{}/edit", id),
            is_edit: true,
            error: Some("Post text cannot be empty."),
            text: form.text,
            image: form.image.unwrap_or_default(),
            groups: group_options(groups, post.group_id),
        }
        .to_response());
    }

    // created_at is immutable; only the editable columns are set.
    posts::ActiveModel {
        id: Set(id),
        text: Set(form.text.trim().to_owned()),
        group_id: Set(form.group_id()),
        image: Set(form.image_value()),
        ..Default::default()
    }
    .update(db)
    .await
    .map_err(error::ErrorInternalServerError)?;

    Ok(redirect_to_post(id))
}
