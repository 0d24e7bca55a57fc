use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use application::{
    testing::{fixed_clock, InMemoryBlogPostRepository, InMemoryUserRepository, PlainPasswordHasher},
    AccountService, AccountServiceDependencies, BlogService, BlogServiceDependencies,
    RegisterUserRequest,
};
use config::{
    DatabaseSettings, FileDatabase, JwtSettings, SecuritySettings, ServerSettings, Settings,
};

use crate::auth::TokenService;
use crate::routes::router;
use crate::state::AppState;

const PASSWORD: &str = "correct horse battery";

fn test_settings(debug: bool) -> Settings {
    let allowed_hosts = vec!["testserver".to_string(), ".wasmer.app".to_string()];
    let security = if debug {
        None
    } else {
        Some(SecuritySettings {
            proxy_ssl_header: ("x-forwarded-proto".to_string(), "https".to_string()),
            hsts_seconds: 3600,
            hsts_include_subdomains: true,
            hsts_preload: false,
            trusted_origins: vec!["https://testserver".to_string()],
        })
    };
    Settings {
        secret_key: "router-test-secret-key".to_string(),
        debug,
        allowed_hosts,
        database: DatabaseSettings::File(FileDatabase {
            path: "/tmp/router-tests.sqlite3".into(),
        }),
        security,
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            bcrypt_cost: None,
        },
        jwt: JwtSettings {
            signing_key: "router-test-secret-key".to_string(),
            access_lifetime_secs: 300,
            refresh_lifetime_secs: 86_400,
        },
        log_level: "INFO".to_string(),
    }
}

fn test_state(debug: bool) -> AppState {
    let settings = test_settings(debug);
    let clock = fixed_clock();

    let blog_service = BlogService::new(BlogServiceDependencies {
        post_repository: Arc::new(InMemoryBlogPostRepository::default()),
        clock: clock.clone(),
    });
    let account_service = AccountService::new(AccountServiceDependencies {
        user_repository: Arc::new(InMemoryUserRepository::default()),
        password_hasher: Arc::new(PlainPasswordHasher),
        clock,
    });
    let token_service = Arc::new(TokenService::new(settings.jwt.clone()));

    AppState::new(
        Arc::new(blog_service),
        Arc::new(account_service),
        token_service,
        Arc::new(settings),
    )
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "testserver");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn register_payload(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": PASSWORD,
    })
}

async fn obtain_access_token(app: &Router, username: &str) -> String {
    let response = send(
        app,
        request("POST", "/auth/users/", None, Some(register_payload(username))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        request(
            "POST",
            "/auth/jwt/create/",
            None,
            Some(json!({"username": username, "password": PASSWORD})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    tokens["access"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_needs_no_authentication() {
    let app = router(test_state(true));

    let response = send(&app, request("GET", "/health", None, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_blog_endpoints_require_a_token() {
    let app = router(test_state(true));

    let response = send(&app, request("GET", "/posts", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, request("GET", "/", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_post_crud_flow() {
    let app = router(test_state(true));
    let token = obtain_access_token(&app, "ada").await;

    // Create without a date: defaults to the (fixed) current date.
    let response = send(
        &app,
        request(
            "POST",
            "/posts",
            Some(&token),
            Some(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "First post",
                "description": "Hello, world."
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["date"], "2024-05-04");
    let post_id = created["id"].as_i64().unwrap();

    // Listed on the blog index.
    let response = send(&app, request("GET", "/", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let index = body_json(response).await;
    assert_eq!(index.as_array().unwrap().len(), 1);

    // Full-record replacement.
    let response = send(
        &app,
        request(
            "PUT",
            &format!("/posts/{post_id}"),
            Some(&token),
            Some(json!({
                "name": "Grace",
                "subject": "Rewritten",
                "date": "2022-12-01",
                "description": "New body."
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let replaced = body_json(response).await;
    assert_eq!(replaced["name"], "Grace");
    assert_eq!(replaced["email"], Value::Null);
    assert_eq!(replaced["date"], "2022-12-01");

    // Delete, then 404.
    let response = send(
        &app,
        request("DELETE", &format!("/posts/{post_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        request("GET", &format!("/posts/{post_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_are_bad_requests() {
    let app = router(test_state(true));
    let token = obtain_access_token(&app, "ada").await;

    let response = send(
        &app,
        request(
            "POST",
            "/posts",
            Some(&token),
            Some(json!({
                "name": "",
                "subject": "s",
                "description": "d"
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_token_refresh_and_verify() {
    let app = router(test_state(true));
    send(
        &app,
        request("POST", "/auth/users/", None, Some(register_payload("ada"))),
    )
    .await;

    let response = send(
        &app,
        request(
            "POST",
            "/auth/jwt/create/",
            None,
            Some(json!({"username": "ada", "password": PASSWORD})),
        ),
    )
    .await;
    let tokens = body_json(response).await;
    let access = tokens["access"].as_str().unwrap().to_string();
    let refresh = tokens["refresh"].as_str().unwrap().to_string();

    // Refresh accepts only refresh tokens.
    let response = send(
        &app,
        request("POST", "/auth/jwt/refresh/", None, Some(json!({"refresh": access}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        request("POST", "/auth/jwt/refresh/", None, Some(json!({"refresh": refresh}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let new_access = body_json(response).await["access"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(&app, request("GET", "/auth/users/me/", Some(&new_access), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "ada");

    // Verify takes either kind of token, rejects garbage.
    let response = send(
        &app,
        request("POST", "/auth/jwt/verify/", None, Some(json!({"token": new_access}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        request("POST", "/auth/jwt/verify/", None, Some(json!({"token": "garbage"}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let app = router(test_state(true));
    send(
        &app,
        request("POST", "/auth/users/", None, Some(register_payload("ada"))),
    )
    .await;

    let response = send(
        &app,
        request(
            "POST",
            "/auth/jwt/create/",
            None,
            Some(json!({"username": "ada", "password": "wrong"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = router(test_state(true));
    send(
        &app,
        request("POST", "/auth/users/", None, Some(register_payload("ada"))),
    )
    .await;

    let response = send(
        &app,
        request("POST", "/auth/users/", None, Some(register_payload("ada"))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_surface_is_staff_only() {
    let state = test_state(true);
    state
        .account_service
        .register_staff(RegisterUserRequest {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    let app = router(state);

    // Anonymous: 401.
    let response = send(&app, request("GET", "/admin/blog/posts", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Regular account: 403.
    let token = obtain_access_token(&app, "ada").await;
    let response = send(&app, request("GET", "/admin/blog/posts", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff: full CRUD over both models.
    let response = send(
        &app,
        request(
            "POST",
            "/auth/jwt/create/",
            None,
            Some(json!({"username": "root", "password": PASSWORD})),
        ),
    )
    .await;
    let staff_token = body_json(response).await["access"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        &app,
        request("GET", "/admin/blog/posts", Some(&staff_token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        request("GET", "/admin/auth/users", Some(&staff_token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_can_promote_and_delete_users() {
    let state = test_state(true);
    state
        .account_service
        .register_staff(RegisterUserRequest {
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    let app = router(state);

    let _ = obtain_access_token(&app, "ada").await;
    let response = send(
        &app,
        request(
            "POST",
            "/auth/jwt/create/",
            None,
            Some(json!({"username": "root", "password": PASSWORD})),
        ),
    )
    .await;
    let staff_token = body_json(response).await["access"]
        .as_str()
        .unwrap()
        .to_string();

    // The second registered account got id 2.
    let response = send(
        &app,
        request(
            "PUT",
            "/admin/auth/users/2",
            Some(&staff_token),
            Some(json!({
                "username": "ada",
                "email": "ada@example.com",
                "is_staff": true,
                "is_active": true
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["is_staff"], true);

    let response = send(
        &app,
        request("DELETE", "/admin/auth/users/2", Some(&staff_token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        request("GET", "/admin/auth/users/2", Some(&staff_token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_auth_login_checks_credentials() {
    let app = router(test_state(true));
    send(
        &app,
        request("POST", "/auth/users/", None, Some(register_payload("ada"))),
    )
    .await;

    let response = send(
        &app,
        request(
            "POST",
            "/api-auth/login/",
            None,
            Some(json!({"username": "ada", "password": PASSWORD})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "ada");

    let response = send(
        &app,
        request(
            "POST",
            "/api-auth/login/",
            None,
            Some(json!({"username": "ada", "password": "bad"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, request("POST", "/api-auth/logout/", None, None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_host_validation_applies_outside_debug() {
    let app = router(test_state(false));

    let response = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::HOST, "evil.com")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Exact entry and wildcard subdomain both pass.
    let response = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::HOST, "myblog.wasmer.app")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_host_validation_skipped_in_debug() {
    let app = router(test_state(true));

    let response = send(
        &app,
        Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::HOST, "evil.com")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_hsts_header_follows_security_settings() {
    let hardened = router(test_state(false));
    let response = send(&hardened, request("GET", "/health", None, None)).await;
    assert_eq!(
        response
            .headers()
            .get(header::STRICT_TRANSPORT_SECURITY)
            .and_then(|v| v.to_str().ok()),
        Some("max-age=3600; includeSubDomains")
    );

    let debug = router(test_state(true));
    let response = send(&debug, request("GET", "/health", None, None)).await;
    assert!(response
        .headers()
        .get(header::STRICT_TRANSPORT_SECURITY)
        .is_none());
}
