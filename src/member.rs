use crate::feed::{self, Pager};
use crate::global;
use crate::index::PageQuery;
use crate::init::get_db_pool;
use crate::login::redirect_to_login;
use crate::middleware::ClientCtx;
use crate::orm::{follows, posts, users};
use crate::post::{feed_query, PostForTemplate};
use crate::user::ClientUser;
use actix_web::{error, get, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::sea_query::{InsertStatement, OnConflict, Query};
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr};

#[derive(Template)]
#[template(path = "member.html")]
pub struct MemberTemplate {
    pub client: ClientCtx,
    pub author: ClientUser,
    pub posts: Vec<PostForTemplate>,
    pub pager: Pager,
    pub posts_count: usize,
    pub following: bool,
    pub can_follow: bool,
}

async fn find_member_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<ClientUser>, DbErr> {
    users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::Name)
        .filter(users::Column::Name.eq(name))
        .into_model::<ClientUser>()
        .one(db)
        .await
}

/// Insert for one follow edge. Duplicates resolve in storage through the
/// unique index on (user_id, author_id); a lookup before insert would race
/// concurrent follow requests.
fn follow_insert(user_id: i32, author_id: i32) -> InsertStatement {
    Query::insert()
        .into_table(follows::Entity)
        .columns([follows::Column::UserId, follows::Column::AuthorId])
        .values_panic(vec![user_id.into(), author_id.into()])
        .on_conflict(
            OnConflict::columns([follows::Column::UserId, follows::Column::AuthorId])
                .do_nothing()
                .to_owned(),
        )
        .to_owned()
}

fn redirect_to_member(name: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", format!("/members/{}", name)))
        .finish()
}

#[get("/members/{username}")]
pub async fn view_member(
    client: ClientCtx,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let username = path.into_inner();

    let author = find_member_by_name(db, &username)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Member not found."))?;

    let per_page = global::get_posts_per_page();
    let feed = feed::assemble(
        feed_query()
            .filter(posts::Column::UserId.eq(author.id))
            .into_model::<PostForTemplate>()
            .paginate(db, per_page),
        per_page,
        query.page,
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    let following = match client.get_id() {
        Some(viewer_id) => follows::Entity::find()
            .filter(follows::Column::UserId.eq(viewer_id))
            .filter(follows::Column::AuthorId.eq(author.id))
            .one(db)
            .await
            .map_err(error::ErrorInternalServerError)?
            .is_some(),
        None => false,
    };

    Ok(MemberTemplate {
        pager: Pager::new(&format!("/members/{}", author.name), &feed),
        can_follow: client.can_follow(author.id),
        client,
        // The profile feed is every post by the author, so its total is the
        // author's post count.
        posts_count: feed.item_count,
        posts: feed.items,
        author,
        following,
    }
    .to_response())
}

#[get("/members/{username}/follow")]
pub async fn follow_member(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let viewer_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(redirect_to_login()),
    };
    let db = get_db_pool();
    let username = path.into_inner();

    let author = find_member_by_name(db, &username)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Member not found."))?;

    // Self-follow is a no-op.
    if client.can_follow(author.id) {
        let stmt = follow_insert(viewer_id, author.id);
        db.execute(db.get_database_backend().build(&stmt))
            .await
            .map_err(error::ErrorInternalServerError)?;
    }

    Ok(redirect_to_member(&author.name))
}

#[get("/members/{username}/unfollow")]
pub async fn unfollow_member(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let viewer_id = match client.get_id() {
        Some(id) => id,
        None => return Ok(redirect_to_login()),
    };
    let db = get_db_pool();
    let username = path.into_inner();

    let author = find_member_by_name(db, &username)
        .await
        .map_err(error::ErrorInternalServerError)?
        .ok_or_else(|| error::ErrorNotFound("Member not found."))?;

    let deleted = follows::Entity::delete_many()
        .filter(follows::Column::UserId.eq(viewer_id))
        .filter(follows::Column::AuthorId.eq(author.id))
        .exec(db)
        .await
        .map_err(error::ErrorInternalServerError)?;

    if deleted.rows_affected == 0 {
        return Err(error::ErrorNotFound("Follow not found."));
    }

    Ok(redirect_to_member(&author.name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbBackend;

    #[test]
    fn duplicate_follow_resolves_in_storage() {
        let sql = DbBackend::Postgres.build(&follow_insert(1, 2)).to_string();
        assert!(
            sql.contains(r#"ON CONFLICT ("user_id", "author_id") DO NOTHING"#),
            "follow insert lost its conflict clause: {}",
            sql
        );
    }

    #[test]
    fn follow_insert_writes_both_endpoints() {
        let sql = DbBackend::Postgres.build(&follow_insert(1, 2)).to_string();
        assert!(sql.contains(r#"INSERT INTO "follows" ("user_id", "author_id")"#));
    }
}
