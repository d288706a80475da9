use axum::{
    Form,
    extract::{
        Path, State,
        rejection::{FormRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use warbler_db::NewMessage;
use warbler_types::Flash;
use warbler_types::forms::MessageForm;

use crate::session::{RequestContext, found};
use crate::{AppError, AppResult, AppState, db_call, render};

pub async fn new_message_page(ctx: RequestContext) -> AppResult<Response> {
    if ctx.user().is_none() {
        return ctx.refuse().await;
    }
    Ok(ctx.page("New message", &render::message_form(None, "")).await?.into_response())
}

/// Post a message as the logged-in user.
pub async fn new_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<MessageForm>, FormRejection>,
) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };
    let Form(form) = form?;

    if let Some(problem) = form.problem() {
        let body = render::message_form(Some(problem), &form.text);
        return Ok(ctx.page("New message", &body).await?.into_response());
    }

    let new = NewMessage {
        text: form.text.trim().to_string(),
        user_id: me.id,
        timestamp: None,
    };
    let msg = db_call(&state, move |db| db.insert_message(&new)).await?;

    info!(message_id = msg.id, "New message from {}", me);
    Ok(found(&format!("/users/{}", me.id)))
}

pub async fn show_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Path(message_id) = path?;
    let message = db_call(&state, move |db| db.get_message(message_id))
        .await?
        .ok_or(AppError::NotFound)?;

    let liked = match ctx.user() {
        Some(v) => {
            let viewer_id = v.id;
            db_call(&state, move |db| {
                Ok(db.liked_message_ids(viewer_id)?.contains(&message_id))
            })
            .await?
        }
        None => false,
    };

    let body = render::message_detail(&message, ctx.user(), liked);
    Ok(ctx.page("Message", &body).await?.into_response())
}

/// Only the author may delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };
    let Path(message_id) = path?;

    let message = db_call(&state, move |db| db.get_message(message_id))
        .await?
        .ok_or(AppError::NotFound)?;
    if message.user_id != me.id {
        warn!(message_id, "{} tried to delete a message by #{}", me, message.user_id);
        return ctx.refuse().await;
    }

    db_call(&state, move |db| db.delete_message(message_id)).await?;
    ctx.flash(Flash::success("Message deleted.")).await?;
    Ok(found(&format!("/users/{}", me.id)))
}
