//! Blog post handlers: publishing, reading, votes and comments.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use uuid::Uuid;

use blog_core::domain::{Ballot, Comment, NewBlogPost};
use blog_core::read::BlogPostView;
use blog_shared::ApiResponse;
use blog_shared::dto::{AddCommentRequest, CastVoteRequest, CreatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/users/{id}/posts
pub async fn list_by_author(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_by_author(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .create(NewBlogPost {
            author_id: identity.user_id,
            title: req.title,
            body: req.body,
            tags: req.tags,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/posts/{id} - counts as a view
pub async fn show(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.view(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id} - admin only
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden);
    }

    let id = path.into_inner();
    state.posts.delete(id).await?;
    tracing::info!(post_id = %id, admin_id = %identity.user_id, "Post removed by admin");

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted")))
}

/// POST /api/posts/{id}/votes
pub async fn vote(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CastVoteRequest>,
) -> AppResult<HttpResponse> {
    let ballot = Ballot::try_from(body.value)?;
    let post = state
        .posts
        .cast_vote(path.into_inner(), identity.user_id, ballot)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// Response to a new comment: the comment itself and the post it landed on.
#[derive(Debug, Serialize)]
pub struct CommentCreated {
    pub comment: Comment,
    pub post: BlogPostView,
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<AddCommentRequest>,
) -> AppResult<HttpResponse> {
    let (comment, post) = state
        .posts
        .add_comment(path.into_inner(), identity.user_id, body.into_inner().body)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(CommentCreated { comment, post })))
}

/// DELETE /api/posts/{id}/comments/{comment_id} - comment author or admin
pub async fn remove_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let post = state
        .posts
        .remove_comment(post_id, comment_id, identity.user_id, identity.is_admin())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}
