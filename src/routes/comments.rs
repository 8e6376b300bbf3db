use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Extension, Json};

use super::{message, parse_id, user_id_or_caller, AppJson, Caller, CommentQuery, ProductUserQuery};
use crate::error::Result;
use crate::services::CommentBody;
use crate::state::AppState;

pub(super) async fn add_comment(State(state): State<AppState>, Extension(caller): Caller, Query(q): Query<ProductUserQuery>, AppJson(body): AppJson<CommentBody>) -> Result<impl IntoResponse> {
    let product_id = parse_id(q.id.as_deref(), "id")?;
    let user_id = user_id_or_caller(q.user_id.as_deref(), "user_id", &caller)?;
    let comment = state.comments().add_comment(product_id, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub(super) async fn delete_comment(State(state): State<AppState>, Query(q): Query<CommentQuery>) -> Result<impl IntoResponse> {
    let product_id = parse_id(q.id.as_deref(), "id")?;
    let comment_id = parse_id(q.comment_id.as_deref(), "comment_id")?;
    state.comments().delete_comment(product_id, comment_id).await?;
    Ok(message("Successfully deleted comment"))
}
