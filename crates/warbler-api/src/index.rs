use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::session::RequestContext;
use crate::{AppError, AppResult, AppState, db_call, render};

const TIMELINE_LIMIT: u32 = 100;

/// Anonymous visitors get the signup prompt; logged-in users their timeline.
pub async fn home(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let Some(user) = ctx.user() else {
        return Ok(ctx.page("Home", &render::home_anon()).await?.into_response());
    };

    let user_id = user.id;
    let (stats, timeline, liked) = db_call(&state, move |db| {
        Ok((
            db.stats(user_id)?,
            db.timeline(user_id, TIMELINE_LIMIT)?,
            db.liked_message_ids(user_id)?,
        ))
    })
    .await?;

    let body = render::home(user, &stats, &timeline, &liked);
    Ok(ctx.page("Home", &body).await?.into_response())
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
