use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use warbler_db::{NewUser, is_constraint_violation};
use warbler_types::Flash;
use warbler_types::forms::{LoginForm, SignupForm, blank_to_none};

use crate::session::{RequestContext, found};
use crate::{AppResult, AppState, db_call, render};

pub async fn signup_page(ctx: RequestContext) -> AppResult<Response> {
    let body = render::signup_form(None, &SignupForm::default());
    Ok(ctx.page("Sign up", &body).await?.into_response())
}

/// Create the account and log it in. A taken username or e-mail re-renders the form.
pub async fn signup(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    if let Some(problem) = form.problem() {
        let body = render::signup_form(Some(problem), &form);
        return Ok(ctx.page("Sign up", &body).await?.into_response());
    }

    let new = NewUser {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
        image_url: blank_to_none(form.image_url.clone()),
        header_image_url: blank_to_none(form.header_image_url.clone()),
        bio: blank_to_none(form.bio.clone()),
    };

    match db_call(&state, move |db| db.signup(&new)).await {
        Ok(user) => {
            ctx.login(&user).await?;
            Ok(found("/"))
        }
        Err(e) if is_constraint_violation(&e) => {
            warn!("Signup rejected for '{}': {}", form.username, e);
            let body = render::signup_form(Some("Username already taken"), &form);
            Ok(ctx.page("Sign up", &body).await?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_page(ctx: RequestContext) -> AppResult<Response> {
    Ok(ctx.page("Log in", &render::login_form("")).await?.into_response())
}

pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let username = form.username.clone();
    let password = form.password;
    let user = db_call(&state, move |db| db.authenticate(&username, &password)).await?;

    match user {
        Some(user) => {
            ctx.login(&user).await?;
            ctx.flash(Flash::success(format!("Hello, {}!", user.username))).await?;
            info!("{} logged in", user);
            Ok(found("/"))
        }
        None => {
            ctx.flash(Flash::danger("Invalid credentials.")).await?;
            Ok(ctx.page("Log in", &render::login_form(&form.username)).await?.into_response())
        }
    }
}

pub async fn logout(ctx: RequestContext) -> AppResult<Response> {
    ctx.logout().await?;
    ctx.flash(Flash::success("You have successfully logged out."))
        .await?;
    Ok(found("/login"))
}
