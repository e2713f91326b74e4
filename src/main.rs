#[actix_web::main]
async fn main() -> std::io::Result<()> {
    rublog::init::init();
    rublog::init::init_db().await;
    rublog::init::start().await
}
