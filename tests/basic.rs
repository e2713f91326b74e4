#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use rublog::cache::FeedCache;

    fn location_of<B>(resp: &actix_web::dev::ServiceResponse<B>) -> &str {
        resp.headers()
            .get("Location")
            .expect("redirect without Location header")
            .to_str()
            .expect("Location header is not a string")
    }

    #[actix_rt::test]
    async fn test_about_pages_get() {
        let app = test::init_service(
            App::new()
                .service(rublog::about::view_about_author)
                .service(rublog::about::view_about_tech),
        )
        .await;

        for uri in ["/about/author", "/about/tech"] {
            let req = test::TestRequest::default().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success(), "{} did not render", uri);
        }
    }

    #[actix_rt::test]
    async fn test_unknown_route_is_404() {
        let app =
            test::init_service(App::new().service(rublog::about::view_about_author)).await;
        let req = test::TestRequest::default().uri("/definitely-not-a-route").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_404_renders_error_document() {
        use actix_web::middleware::ErrorHandlers;

        let app = test::init_service(
            App::new()
                .wrap(
                    ErrorHandlers::new()
                        .handler(StatusCode::NOT_FOUND, rublog::error_page::render_404),
                )
                .service(rublog::about::view_about_author),
        )
        .await;
        let req = test::TestRequest::default().uri("/definitely-not-a-route").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).expect("error document is not utf8");
        assert!(body.contains("404 Not Found"));
    }

    #[actix_rt::test]
    async fn test_guest_redirected_from_post_creator() {
        let app = test::init_service(App::new().service(rublog::post::create_post_get)).await;
        let req = test::TestRequest::default().uri("/posts/create").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location_of(&resp), "/login");
    }

    #[actix_rt::test]
    async fn test_guest_redirected_from_follow_feed() {
        let app = test::init_service(App::new().service(rublog::index::view_feed)).await;
        let req = test::TestRequest::default().uri("/feed").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location_of(&resp), "/login");
    }

    #[actix_rt::test]
    async fn test_guest_comment_writes_nothing() {
        // The guard fires before any storage access, so a guest comment
        // cannot change the stored comment count.
        let app = test::init_service(App::new().service(rublog::comment::create_comment)).await;
        let req = test::TestRequest::post()
            .uri("/posts/1/comment")
            .set_form(&[("text", "drive-by comment")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location_of(&resp), "/login");
    }

    #[actix_rt::test]
    async fn test_expire_feed_cache_task() {
        let cache = web::Data::new(FeedCache::new(chrono::Duration::seconds(20)));
        cache.put("index:page:1".to_owned(), "stale render".to_owned());

        let app = test::init_service(
            App::new()
                .app_data(cache.clone())
                .service(rublog::index::view_task_expire_feed_cache),
        )
        .await;
        let req = test::TestRequest::default()
            .uri("/tasks/expire-feed-cache")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location_of(&resp), "/");
        assert_eq!(cache.get("index:page:1"), None);
    }
}
