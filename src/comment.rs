use crate::init::get_db_pool;
use crate::login::redirect_to_login;
use crate::middleware::ClientCtx;
use crate::orm::{comments, posts, users};
use actix_web::{error, post, web, Error, HttpResponse};
use chrono::prelude::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, FromQueryResult, Select};
use serde::Deserialize;

#[derive(Debug, FromQueryResult)]
pub struct CommentForTemplate {
    pub id: i32,
    pub text: String,
    pub created_at: chrono::NaiveDateTime,
    pub user_id: i32,
    // join users
    pub username: Option<String>,
}

impl CommentForTemplate {
    pub fn author_name(&self) -> &str {
        self.username.as_deref().unwrap_or("Guest")
    }
}

/// Comments render oldest first, id as the tie-break under equal timestamps.
fn comments_query(post_id: i32) -> Select<comments::Entity> {
    comments::Entity::find()
        .left_join(users::Entity)
        .column_as(users::Column::Name, "username")
        .filter(comments::Column::PostId.eq(post_id))
        .order_by_asc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
}

pub async fn get_comments_for_template(
    db: &DatabaseConnection,
    post_id: i32,
) -> Result<Vec<CommentForTemplate>, DbErr> {
    comments_query(post_id)
        .into_model::<CommentForTemplate>()
        .all(db)
        .await
}

#[derive(Deserialize)]
pub struct NewCommentFormData {
    pub text: String,
}

#[post("/posts/{post_id}/comment")]
pub async fn create_comment(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Form<NewCommentFormData>,
) -> Result<HttpResponse, Error> {
    let user_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(redirect_to_login()),
    };
    let db = get_db_pool();
    let post_id = path.into_inner();

    let post = posts::Entity::find_by_id(post_id)
        .one(db)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Post not found."))?;

    // Blank submissions write nothing; either way the client returns to the
    // detail view.
    if !form.text.trim().is_empty() {
        comments::ActiveModel {
            post_id: Set(post.id),
            user_id: Set(user_id),
            text: Set(form.text.trim().to_owned()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(error::ErrorInternalServerError)?;
    }

    Ok(HttpResponse::Found()
        .append_header(("Location", format!("/posts/{}", post_id)))
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbBackend;

    #[test]
    fn comments_read_oldest_first_with_stable_ties() {
        let sql = comments_query(7).build(DbBackend::Postgres).to_string();
        assert!(
            sql.contains(r#"ORDER BY "comments"."created_at" ASC, "comments"."id" ASC"#),
            "comment listing lost its ordering: {}",
            sql
        );
    }
}
