use axum::{
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::session::{RequestContext, found};
use crate::users::{load_user, viewer_likes};
use crate::{AppError, AppResult, AppState, db_call, render};

/// Like the message if the logged-in user has not yet, unlike it otherwise.
pub async fn toggle_like(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };
    let Path(message_id) = path?;

    let me_id = me.id;
    let liked = db_call(&state, move |db| db.toggle_like(me_id, message_id))
        .await?
        .ok_or(AppError::NotFound)?;

    debug!(message_id, liked, "Toggled like for user #{}", me_id);
    Ok(found("/"))
}

pub async fn show_likes(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    if ctx.user().is_none() {
        return ctx.refuse().await;
    }
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;
    let messages = db_call(&state, move |db| db.likes(user_id)).await?;
    let liked = viewer_likes(&state, ctx.user()).await?;

    let body = render::user_likes(&user, &messages, ctx.user(), &liked);
    Ok(ctx.page("Likes", &body).await?.into_response())
}
