//! # ss-api Handlers
//!
//! Thin JSON adapters between HTTP requests and the facade. Callers identify
//! themselves with `Authorization: Bearer <access token>`.

use crate::error::ApiResult;
use crate::facade::StyleSync;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use ss_core::error::AppError;
use ss_core::models::{
    AuthUser, BoardUpdate, EventUpdate, ImageUpload, ItemUpdate, NewBoard, NewEvent, NewItem, NewOutfit,
    OAuthProvider, OutfitUpdate, Position, ProfileUpdate, SignUpRequest,
};

pub type AppData = web::Data<StyleSync>;

/// Header carrying the original file name of a raw image upload.
pub const FILE_NAME_HEADER: &str = "x-file-name";

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn current_user(app: &StyleSync, req: &HttpRequest) -> ApiResult<AuthUser> {
    let token = bearer_token(req).ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;
    let session = app
        .auth()
        .session(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("session expired".into()))?;
    Ok(session.user)
}

/// Like [`current_user`], but a request without a token is anonymous.
async fn optional_user(app: &StyleSync, req: &HttpRequest) -> ApiResult<Option<AuthUser>> {
    if bearer_token(req).is_none() {
        return Ok(None);
    }
    current_user(app, req).await.map(Some)
}

fn image_upload(req: &HttpRequest, body: web::Bytes) -> ApiResult<ImageUpload> {
    let file_name = req
        .headers()
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::validation(format!("{FILE_NAME_HEADER} header is required")))?;
    if body.is_empty() {
        return Err(AppError::validation("image body is empty").into());
    }
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    Ok(ImageUpload { file_name: file_name.to_string(), content_type, data: body })
}

// ── Auth ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

pub async fn sign_in(app: AppData, body: web::Json<SignInRequest>) -> ApiResult<HttpResponse> {
    let session = app.auth().sign_in(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(session))
}

pub async fn sign_up(app: AppData, body: web::Json<SignUpRequest>) -> ApiResult<HttpResponse> {
    let outcome = app.auth().sign_up(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct OAuthQuery {
    pub redirect_to: String,
}

pub async fn sign_in_with_provider(
    app: AppData,
    path: web::Path<String>,
    query: web::Query<OAuthQuery>,
) -> ApiResult<HttpResponse> {
    let provider = match path.as_str() {
        "google" => OAuthProvider::Google,
        "apple" => OAuthProvider::Apple,
        other => return Err(AppError::validation(format!("unsupported provider: {other}")).into()),
    };
    let url = app.auth().sign_in_with_provider(provider, &query.redirect_to).await?;
    Ok(HttpResponse::Ok().json(json!({ "url": url })))
}

pub async fn session(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let token = bearer_token(&req).ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;
    match app.auth().session(token).await? {
        Some(session) => Ok(HttpResponse::Ok().json(session)),
        None => Err(AppError::Unauthorized("session expired".into()).into()),
    }
}

pub async fn sign_out(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let token = bearer_token(&req).ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;
    app.auth().sign_out(token).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Profile ─────────────────────────────────────────────────────────────────

pub async fn get_profile(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.users().get_profile(&user.id).await?))
}

pub async fn update_profile(
    app: AppData,
    req: HttpRequest,
    body: web::Json<ProfileUpdate>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.users().update_profile(&user.id, body.into_inner()).await?))
}

pub async fn upload_avatar(app: AppData, req: HttpRequest, body: web::Bytes) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    let upload = image_upload(&req, body)?;
    let url = app.users().upload_avatar(&user.id, upload).await?;
    Ok(HttpResponse::Created().json(json!({ "url": url })))
}

pub async fn profile_stats(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.users().stats(&user.id).await))
}

// ── Catalogue ───────────────────────────────────────────────────────────────

pub async fn list_categories(app: AppData) -> HttpResponse {
    HttpResponse::Ok().json(app.categories().list().await)
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub favorites: bool,
}

pub async fn list_items(app: AppData, req: HttpRequest, query: web::Query<ItemsQuery>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    let items = app.items();
    let listed = match (&query.q, &query.category) {
        _ if query.favorites => items.list_favorites(&user.id).await,
        (Some(q), category) => items.search(&user.id, q, category.as_deref()).await,
        (None, Some(category)) => items.list_by_category(&user.id, category).await,
        (None, None) => items.list(&user.id).await,
    };
    Ok(HttpResponse::Ok().json(listed))
}

pub async fn create_item(app: AppData, req: HttpRequest, body: web::Json<NewItem>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Created().json(app.items().create(&user.id, body.into_inner()).await?))
}

pub async fn update_item(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ItemUpdate>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.items().update(&user.id, &path, body.into_inner()).await?))
}

#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub value: bool,
}

pub async fn set_favorite(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<FlagRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.items().set_favorite(&user.id, &path, body.value).await?))
}

pub async fn delete_item(app: AppData, req: HttpRequest, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    app.items().delete(&user.id, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn upload_item_image(app: AppData, req: HttpRequest, body: web::Bytes) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    let upload = image_upload(&req, body)?;
    let url = app.items().upload_image(&user.id, upload).await;
    Ok(HttpResponse::Created().json(json!({ "url": url })))
}

// ── Outfits ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct OutfitsQuery {
    #[serde(default)]
    pub starred: bool,
}

pub async fn list_outfits(
    app: AppData,
    req: HttpRequest,
    query: web::Query<OutfitsQuery>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    let outfits = if query.starred {
        app.outfits().list_starred(&user.id).await
    } else {
        app.outfits().list(&user.id).await
    };
    Ok(HttpResponse::Ok().json(outfits))
}

pub async fn starred_outfits(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.outfits().list_starred_with_items(&user.id).await))
}

pub async fn create_outfit(app: AppData, req: HttpRequest, body: web::Json<NewOutfit>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Created().json(app.outfits().create(&user.id, body.into_inner()).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomRequest {
    #[serde(default)]
    pub category_ids: Vec<String>,
}

pub async fn random_outfit(
    app: AppData,
    req: HttpRequest,
    body: Option<web::Json<RandomRequest>>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let outfit = app.outfits().generate_random(&user.id, &request.category_ids).await?;
    Ok(HttpResponse::Created().json(outfit))
}

pub async fn update_outfit(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<OutfitUpdate>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.outfits().update(&user.id, &path, body.into_inner()).await?))
}

pub async fn set_starred(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<FlagRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.outfits().set_starred(&user.id, &path, body.value).await?))
}

pub async fn delete_outfit(app: AppData, req: HttpRequest, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    app.outfits().delete(&user.id, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Planner ─────────────────────────────────────────────────────────────────

pub async fn list_events(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.events().list(&user.id).await))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<usize>,
}

pub async fn upcoming_events(
    app: AppData,
    req: HttpRequest,
    query: web::Query<UpcomingQuery>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.events().upcoming(&user.id, query.limit).await))
}

pub async fn create_event(app: AppData, req: HttpRequest, body: web::Json<NewEvent>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Created().json(app.events().create(&user.id, body.into_inner()).await?))
}

pub async fn update_event(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<EventUpdate>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.events().update(&user.id, &path, body.into_inner()).await?))
}

pub async fn delete_event(app: AppData, req: HttpRequest, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    app.events().delete(&user.id, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Boards ──────────────────────────────────────────────────────────────────

pub async fn list_boards(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.boards().list(&user.id).await?))
}

pub async fn public_boards(app: AppData) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(app.boards().list_public().await?))
}

/// Anonymous callers see public boards only.
pub async fn get_board(app: AppData, req: HttpRequest, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let viewer = optional_user(&app, &req).await?;
    let viewer_id = viewer.as_ref().map(|u| u.id.as_str());
    Ok(HttpResponse::Ok().json(app.boards().get(viewer_id, &path).await?))
}

pub async fn create_board(app: AppData, req: HttpRequest, body: web::Json<NewBoard>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Created().json(app.boards().create(&user.id, body.into_inner()).await?))
}

pub async fn update_board(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<BoardUpdate>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.boards().update(&user.id, &path, body.into_inner()).await?))
}

pub async fn delete_board(app: AppData, req: HttpRequest, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    app.boards().delete(&user.id, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub item_id: String,
    pub x: f64,
    pub y: f64,
}

pub async fn add_board_item(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<PlaceRequest>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    let position = Position { x: body.x, y: body.y };
    Ok(HttpResponse::Created().json(app.boards().add_item(&user.id, &path, &body.item_id, position).await?))
}

pub async fn move_board_item(
    app: AppData,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<Position>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.boards().move_item(&user.id, &path, body.into_inner()).await?))
}

pub async fn remove_board_item(app: AppData, req: HttpRequest, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    app.boards().remove_item(&user.id, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ── Diagnostics ─────────────────────────────────────────────────────────────

pub async fn test_connection(app: AppData) -> HttpResponse {
    HttpResponse::Ok().json(app.diagnostics().test_connection().await)
}

pub async fn test_storage(app: AppData) -> HttpResponse {
    HttpResponse::Ok().json(app.diagnostics().test_storage().await)
}

pub async fn debug_database(app: AppData) -> HttpResponse {
    HttpResponse::Ok().json(app.diagnostics().debug_database().await)
}

pub async fn clear_local_records(app: AppData, req: HttpRequest) -> ApiResult<HttpResponse> {
    let user = current_user(&app, &req).await?;
    Ok(HttpResponse::Ok().json(app.diagnostics().clear_local_records(&user.id).await))
}
