//! User management controller.

use crate::{
    extractors::SearchQuery,
    responses::{ok, ApiResult, AppError, CreatedUser},
    state::AppState,
};
use accounts_core::{AccountError, Page, UserId};
use accounts_service::{
    ChangePasswordRequest, CreateUserRequest, UpdateAvatarRequest, UpdateUserRequest, UserResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::debug;

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_users).post(create_user))
        .route("/by-username/:username", get(get_user_by_username))
        .route("/by-email/:email", get(get_user_by_email))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/password", put(change_password))
        .route("/:id/avatar", put(update_avatar))
}

/// Search users by username, email or full name.
async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Page<UserResponse>> {
    debug!("Search users request: '{}'", query.term());

    let page = state
        .user_service
        .search_users(query.term(), query.page_request())
        .await?;
    ok(page.map(UserResponse::from))
}

/// Create a new user.
async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<CreatedUser, AppError> {
    debug!("Create user request: {}", request.username);

    let user = state.user_service.create_user(request).await?;
    Ok(CreatedUser(UserResponse::from(user)))
}

/// Get a user by ID.
async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserResponse> {
    debug!("Get user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let user = state.user_service.get_user(user_id).await?;
    ok(UserResponse::from(user))
}

/// Get a user by username.
async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<UserResponse> {
    debug!("Get user by username request: {}", username);

    let user = state.user_service.get_user_by_username(&username).await?;
    ok(UserResponse::from(user))
}

/// Get a user by email.
async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<UserResponse> {
    debug!("Get user by email request: {}", email);

    let user = state.user_service.get_user_by_email(&email).await?;
    ok(UserResponse::from(user))
}

/// Update a user's profile.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    debug!("Update user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let user = state.user_service.update_user(user_id, request).await?;
    ok(UserResponse::from(user))
}

/// Delete a user.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete user request: {}", id);

    let user_id = parse_user_id(&id)?;
    state.user_service.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change a user's password.
async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    debug!("Change password request: {}", id);

    let user_id = parse_user_id(&id)?;
    state.user_service.change_password(user_id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace a user's avatar.
async fn update_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAvatarRequest>,
) -> Result<StatusCode, AppError> {
    debug!("Update avatar request: {}", id);

    let user_id = parse_user_id(&id)?;
    state.user_service.update_avatar(user_id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_user_id(id: &str) -> Result<UserId, AppError> {
    id.parse::<UserId>()
        .map_err(|_| AppError(AccountError::validation(format!("Invalid user ID: {}", id))))
}

#[cfg(test)]
mod tests {
    use crate::testing::{app, json_body, sample_user, MockUserService};
    use accounts_core::{AccountError, Page, PageRequest, UniqueField, UserId};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_returns_201_without_password_hash() {
        let mut service = MockUserService::new();
        service
            .expect_create_user()
            .times(1)
            .returning(|request| Ok(sample_user(7, &request.username, &request.email)));

        let response = app(service)
            .oneshot(json_request(
                Method::POST,
                "/api/v1/users",
                serde_json::json!({
                    "username": "alice",
                    "email": "a@x.com",
                    "password": "password123"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/api/v1/users/7");
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], 7);
        assert_eq!(body["data"]["username"], "alice");
        assert!(body["data"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_create_user_conflict_maps_to_409() {
        let mut service = MockUserService::new();
        service
            .expect_create_user()
            .returning(|_| Err(AccountError::AlreadyExists(UniqueField::Email)));

        let response = app(service)
            .oneshot(json_request(
                Method::POST,
                "/api/v1/users",
                serde_json::json!({
                    "username": "bob",
                    "email": "a@x.com",
                    "password": "password123"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "EMAIL_EXISTS");
        assert_eq!(body["error"]["details"][0]["field"], "email");
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let mut service = MockUserService::new();
        service
            .expect_get_user()
            .withf(|id| *id == UserId(7))
            .returning(|id| Ok(sample_user(id.0, "alice", "a@x.com")));

        let response = app(service).oneshot(get("/api/v1/users/7")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_get_user_invalid_id_is_400() {
        let response = app(MockUserService::new())
            .oneshot(get("/api/v1/users/abc"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_missing_user_is_404() {
        let mut service = MockUserService::new();
        service
            .expect_get_user()
            .returning(|id| Err(AccountError::not_found("User", id)));

        let response = app(service).oneshot(get("/api/v1/users/9")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_by_username_and_email() {
        let mut service = MockUserService::new();
        service
            .expect_get_user_by_username()
            .withf(|username| username.to_string() == "alice")
            .returning(|username| Ok(sample_user(7, username, "a@x.com")));
        service
            .expect_get_user_by_email()
            .withf(|email| email.to_string() == "a@x.com")
            .returning(|email| Ok(sample_user(7, "alice", email)));
        let app = app(service);

        let response = app
            .clone()
            .oneshot(get("/api/v1/users/by-username/alice"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/api/v1/users/by-email/a@x.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["id"], 7);
    }

    #[tokio::test]
    async fn test_search_passes_query_and_page() {
        let mut service = MockUserService::new();
        service
            .expect_search_users()
            .withf(|query, page| query.to_string() == "ali" && *page == PageRequest::new(2, 5))
            .returning(|_, page| Ok(Page::new(vec![sample_user(3, "alina", "al@x.com")], page, 6)));

        let response = app(service)
            .oneshot(get("/api/v1/users?q=ali&page=2&limit=5"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["content"][0]["username"], "alina");
        assert_eq!(body["data"]["total_elements"], 6);
        assert_eq!(body["data"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn test_update_user() {
        let mut service = MockUserService::new();
        service
            .expect_update_user()
            .withf(|id, request| *id == UserId(7) && request.username.as_deref() == Some("alice2"))
            .returning(|id, _| Ok(sample_user(id.0, "alice2", "a@x.com")));

        let response = app(service)
            .oneshot(json_request(
                Method::PUT,
                "/api/v1/users/7",
                serde_json::json!({ "username": "alice2" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["username"], "alice2");
    }

    #[tokio::test]
    async fn test_delete_user_returns_204() {
        let mut service = MockUserService::new();
        service.expect_delete_user().times(1).returning(|_| Ok(()));

        let response = app(service)
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/v1/users/7")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_change_password_wrong_current_is_401() {
        let mut service = MockUserService::new();
        service
            .expect_change_password()
            .returning(|_, _| Err(AccountError::InvalidCredentials));

        let response = app(service)
            .oneshot(json_request(
                Method::PUT,
                "/api/v1/users/7/password",
                serde_json::json!({
                    "current_password": "wrong",
                    "new_password": "newpassword"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_avatar_returns_204() {
        let mut service = MockUserService::new();
        service
            .expect_update_avatar()
            .withf(|id, request| *id == UserId(7) && request.avatar_url.ends_with("a.png"))
            .returning(|_, _| Ok(()));

        let response = app(service)
            .oneshot(json_request(
                Method::PUT,
                "/api/v1/users/7/avatar",
                serde_json::json!({ "avatar_url": "https://cdn.example.com/a.png" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let mut service = MockUserService::new();
        service
            .expect_get_user()
            .returning(|_| Err(AccountError::Database("connection refused at 10.0.0.5".to_string())));

        let response = app(service).oneshot(get("/api/v1/users/1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
