use std::collections::HashSet;

use axum::{
    Form,
    extract::{
        Path, Query, State,
        rejection::{FormRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use warbler_db::{ProfileUpdate, UserRow, is_constraint_violation};
use warbler_types::Flash;
use warbler_types::forms::{ProfileForm, UserSearch, blank_to_none};

use crate::session::{RequestContext, found};
use crate::{AppError, AppResult, AppState, db_call, render};

const PROFILE_MESSAGE_LIMIT: u32 = 100;

pub(crate) async fn load_user(state: &AppState, user_id: i64) -> AppResult<UserRow> {
    db_call(state, move |db| db.get_user(user_id))
        .await?
        .ok_or(AppError::NotFound)
}

/// Ids of the messages the viewer likes; empty for anonymous viewers.
pub(crate) async fn viewer_likes(
    state: &AppState,
    viewer: Option<&UserRow>,
) -> AppResult<HashSet<i64>> {
    match viewer {
        Some(v) => {
            let viewer_id = v.id;
            Ok(db_call(state, move |db| db.liked_message_ids(viewer_id)).await?)
        }
        None => Ok(HashSet::new()),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(UserSearch { q }): Query<UserSearch>,
) -> AppResult<Response> {
    let search = blank_to_none(q);
    let needle = search.clone();
    let users = db_call(&state, move |db| db.list_users(needle.as_deref())).await?;

    let body = render::user_list(&users, search.as_deref());
    Ok(ctx.page("Users", &body).await?.into_response())
}

pub async fn show_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;

    let viewer_id = ctx.user().map(|v| v.id);
    let (stats, messages, viewer_follows) = db_call(&state, move |db| {
        let follows = match viewer_id {
            Some(viewer_id) => db.is_following(viewer_id, user_id)?,
            None => false,
        };
        Ok((db.stats(user_id)?, db.messages(user_id, PROFILE_MESSAGE_LIMIT)?, follows))
    })
    .await?;
    let liked = viewer_likes(&state, ctx.user()).await?;

    let body = render::user_detail(&user, &stats, &messages, ctx.user(), viewer_follows, &liked);
    Ok(ctx.page(&format!("@{}", user.username), &body).await?.into_response())
}

pub async fn show_following(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    if ctx.user().is_none() {
        return ctx.refuse().await;
    }
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;
    let following = db_call(&state, move |db| db.following(user_id)).await?;

    let body = render::user_connections(&user, "Following", &following);
    Ok(ctx.page("Following", &body).await?.into_response())
}

pub async fn show_followers(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    if ctx.user().is_none() {
        return ctx.refuse().await;
    }
    let Path(user_id) = path?;
    let user = load_user(&state, user_id).await?;
    let followers = db_call(&state, move |db| db.followers(user_id)).await?;

    let body = render::user_connections(&user, "Followers", &followers);
    Ok(ctx.page("Followers", &body).await?.into_response())
}

/// The logged-in user starts following `user_id`.
pub async fn follow(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };
    let Path(user_id) = path?;
    let followed = load_user(&state, user_id).await?;

    let me_id = me.id;
    db_call(&state, move |db| db.follow(me_id, followed.id)).await?;
    Ok(found(&format!("/users/{me_id}/following")))
}

pub async fn stop_following(
    State(state): State<AppState>,
    ctx: RequestContext,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };
    let Path(user_id) = path?;
    let followed = load_user(&state, user_id).await?;

    let me_id = me.id;
    db_call(&state, move |db| db.unfollow(me_id, followed.id)).await?;
    Ok(found(&format!("/users/{me_id}/following")))
}

pub async fn edit_profile_page(ctx: RequestContext) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };
    let body = render::profile_form(me, None);
    Ok(ctx.page("Edit profile", &body).await?.into_response())
}

/// Apply profile changes once the current password checks out.
pub async fn edit_profile(
    State(state): State<AppState>,
    ctx: RequestContext,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };
    let Form(form) = form?;

    let (me_id, username, password) = (me.id, me.username.clone(), form.password.clone());
    let verified = db_call(&state, move |db| db.authenticate(&username, &password)).await?;
    if verified.is_none() {
        warn!("Profile edit for {} rejected: incorrect password", me);
        ctx.flash(Flash::danger("Incorrect password.")).await?;
        return Ok(found("/"));
    }

    if form.username.trim().is_empty() || form.email.trim().is_empty() {
        let body = render::profile_form(me, Some("Username and e-mail are required."));
        return Ok(ctx.page("Edit profile", &body).await?.into_response());
    }

    let update = ProfileUpdate {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        image_url: blank_to_none(form.image_url),
        header_image_url: blank_to_none(form.header_image_url),
        bio: blank_to_none(form.bio),
        location: blank_to_none(form.location),
    };

    match db_call(&state, move |db| db.update_profile(me_id, &update)).await {
        Ok(user) => {
            info!("Profile updated for {}", user);
            ctx.flash(Flash::success("Profile updated.")).await?;
            Ok(found(&format!("/users/{me_id}")))
        }
        Err(e) if is_constraint_violation(&e) => {
            let body = render::profile_form(me, Some("Username or e-mail already taken"));
            Ok(ctx.page("Edit profile", &body).await?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete the logged-in user with everything they own, then log out.
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.refuse().await;
    };

    let me_id = me.id;
    db_call(&state, move |db| db.delete_user(me_id)).await?;
    ctx.logout().await?;
    ctx.flash(Flash::info("Your account has been deleted."))
        .await?;
    Ok(found("/signup"))
}
