//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::show))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/votes", web::post().to(posts::vote))
                    .route("/{id}/comments", web::post().to(posts::add_comment))
                    .route(
                        "/{id}/comments/{comment_id}",
                        web::delete().to(posts::remove_comment),
                    ),
            )
            .route("/users/{id}/posts", web::get().to(posts::list_by_author)),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use blog_infra::{InMemoryBlogPostRepository, InMemoryUserRepository, JwtConfig, JwtTokenService};

    use super::configure_routes;
    use crate::state::AppState;

    fn state() -> AppState {
        AppState::from_parts(
            Arc::new(InMemoryBlogPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(JwtTokenService::new(JwtConfig::default())),
        )
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    /// Register a user and return their bearer token.
    macro_rules! register {
        ($app:expr, $name:expr) => {{
            let name: &str = $name;
            let req = test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "username": name,
                    "email": format!("{name}@example.com"),
                    "password": "correct horse battery",
                }))
                .to_request();
            let body: Value = test::call_and_read_body_json($app, req).await;
            body["access_token"].as_str().unwrap_or_default().to_string()
        }};
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!(state());
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_create_post_starts_at_score_one() {
        let app = app!(state());
        let token = register!(&app, "alice");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&token))
            .set_json(json!({ "title": "Hello", "body": "World", "tags": ["intro"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["score"], 1);
        assert_eq!(body["data"]["author"]["username"], "alice");
        assert!(body["data"]["author"].get("role").is_none());
    }

    #[actix_web::test]
    async fn test_create_post_requires_auth() {
        let app = app!(state());

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "Hello", "body": "World" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_vote_and_comment_flow() {
        let app = app!(state());
        let alice = register!(&app, "alice");
        let bob = register!(&app, "bob");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&alice))
            .set_json(json!({ "title": "Hello", "body": "World" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/votes"))
            .insert_header(bearer(&bob))
            .set_json(json!({ "value": -1 }))
            .to_request();
        let voted: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(voted["data"]["score"], 0);
        assert_eq!(voted["data"]["vote_count"], 2);

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/votes"))
            .insert_header(bearer(&bob))
            .set_json(json!({ "value": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/comments"))
            .insert_header(bearer(&bob))
            .set_json(json!({ "body": "Nice" }))
            .to_request();
        let commented: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(commented["data"]["post"]["comment_count"], 1);
        assert_eq!(
            commented["data"]["post"]["comments"][0]["author"]["username"],
            "bob"
        );
        let comment_id = commented["data"]["comment"]["id"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        assert_eq!(commented["data"]["post"]["comments"][0]["id"], comment_id.as_str());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}/comments/{}", uuid::Uuid::new_v4()))
            .insert_header(bearer(&bob))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}/comments/{comment_id}"))
            .insert_header(bearer(&bob))
            .to_request();
        let removed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(removed["data"]["comment_count"], 0);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}"))
            .to_request();
        let shown: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(shown["data"]["view_count"], 1);
    }

    #[actix_web::test]
    async fn test_only_comment_author_removes_comment() {
        let app = app!(state());
        let alice = register!(&app, "alice");
        let bob = register!(&app, "bob");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&bob))
            .set_json(json!({ "title": "Hello", "body": "World" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{id}/comments"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "body": "First!" }))
            .to_request();
        let commented: Value = test::call_and_read_body_json(&app, req).await;
        let comment_id = commented["data"]["comment"]["id"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}/comments/{comment_id}"))
            .insert_header(bearer(&bob))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{id}"))
            .to_request();
        let shown: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(shown["data"]["comment_count"], 1);
    }

    #[actix_web::test]
    async fn test_delete_requires_admin() {
        let app = app!(state());
        let alice = register!(&app, "alice");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&alice))
            .set_json(json!({ "title": "Hello", "body": "World" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["data"]["id"].as_str().unwrap_or_default().to_string();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{id}"))
            .insert_header(bearer(&alice))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_unknown_post_is_problem_details() {
        let app = app!(state());

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{}", uuid::Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["title"], "Not Found");
    }
}
