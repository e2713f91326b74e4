use crate::cache::FeedCache;
use crate::middleware::ClientCtx;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{cookie::Key, web, App, HttpServer};
use env_logger::Env;
use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

#[inline(always)]
pub fn get_db_pool() -> &'static DatabaseConnection {
    unsafe { DB_POOL.get_unchecked() }
}

/// Opens the database URL and initializes the DB_POOL static.
/// This MUST be called before get_db_pool, which is unsafe code.
pub async fn init_db() {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .sqlx_logging(true);

    let pool = Database::connect(opt)
        .await
        .expect("Database connection was not established.");
    DB_POOL.set(pool).expect("DB_POOL set twice");
}

/// Initialize third party crates and our own statics.
pub fn init() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    crate::global::init();
}

/// Routes, read top->down; higher traffic routes are placed higher.
pub fn configure(conf: &mut web::ServiceConfig) {
    conf.service(crate::index::view_index)
        .service(crate::index::view_feed)
        .service(crate::group::view_group)
        .service(crate::member::view_member)
        .service(crate::member::follow_member)
        .service(crate::member::unfollow_member)
        // "/posts/create" must register ahead of "/posts/{post_id}".
        .service(crate::post::create_post_get)
        .service(crate::post::create_post_post)
        .service(crate::post::view_post)
        .service(crate::post::edit_post)
        .service(crate::post::update_post)
        .service(crate::comment::create_comment)
        .service(crate::login::view_login)
        .service(crate::login::post_login)
        .service(crate::logout::view_logout)
        .service(crate::create_user::create_user_get)
        .service(crate::create_user::create_user_post)
        .service(crate::about::view_about_author)
        .service(crate::about::view_about_tech)
        .service(crate::index::view_task_expire_feed_cache);
}

/// This MUST NOT be called before init_db()
pub async fn start() -> std::io::Result<()> {
    let feed_cache = web::Data::new(FeedCache::new(crate::global::get_feed_cache_ttl()));
    let secret_key = Key::generate(); // TODO: Should be from .env file

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(feed_cache.clone())
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, crate::error_page::render_404)
                    .handler(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        crate::error_page::render_500,
                    ),
            )
            .wrap(ClientCtx::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                secret_key.clone(),
            ))
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(configure)
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
