use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::warn;

use warbler_db::UserRow;
use warbler_types::Flash;

use crate::{AppError, AppResult, AppState, db_call, render};

/// Session key holding the logged-in user's id.
pub const CURR_USER_KEY: &str = "curr_user";
/// Session key holding pending flash notices.
pub const FLASHES_KEY: &str = "_flashes";

pub const UNAUTHORIZED: &str = "Access unauthorized.";

/// Per-request view of the session: the session handle plus the user it
/// belongs to, if any. A session pointing at a deleted user is anonymous.
pub struct RequestContext {
    pub session: Session,
    pub user: Option<UserRow>,
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, reason)| AppError::Internal(anyhow::anyhow!(reason)))?;

        let user = match session.get::<i64>(CURR_USER_KEY).await? {
            Some(id) => db_call(state, move |db| db.get_user(id)).await?,
            None => None,
        };

        Ok(Self { session, user })
    }
}

impl RequestContext {
    pub fn user(&self) -> Option<&UserRow> {
        self.user.as_ref()
    }

    pub async fn login(&self, user: &UserRow) -> AppResult<()> {
        self.session.cycle_id().await?;
        self.session.insert(CURR_USER_KEY, user.id).await?;
        Ok(())
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.session.remove::<i64>(CURR_USER_KEY).await?;
        Ok(())
    }

    pub async fn flash(&self, flash: Flash) -> AppResult<()> {
        let mut pending: Vec<Flash> = self.session.get(FLASHES_KEY).await?.unwrap_or_default();
        pending.push(flash);
        self.session.insert(FLASHES_KEY, pending).await?;
        Ok(())
    }

    async fn take_flashes(&self) -> AppResult<Vec<Flash>> {
        Ok(self.session.remove::<Vec<Flash>>(FLASHES_KEY).await?.unwrap_or_default())
    }

    /// Refuse the request: flash "Access unauthorized." and send the client home.
    /// Nothing has been written when this is called.
    pub async fn refuse(&self) -> AppResult<Response> {
        match &self.user {
            Some(user) => warn!("Refused request from {}", user),
            None => warn!("Refused anonymous request"),
        }
        self.flash(Flash::danger(UNAUTHORIZED)).await?;
        Ok(found("/"))
    }

    /// Wrap `body` in the site layout, consuming any pending flashes.
    pub async fn page(&self, title: &str, body: &str) -> AppResult<Html<String>> {
        let flashes = self.take_flashes().await?;
        Ok(Html(render::layout(title, self.user(), &flashes, body)))
    }
}

/// `302 Found` redirect.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
