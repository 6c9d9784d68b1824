//! Sign-in and sign-out against the backend session.

use crate::api::Fetchers;
use crate::api::error::ApiError;
use crate::models::UserSession;
use log::{debug, warn};

/// Establishes the backend session and returns the signed-in user with their role.
///
/// With an access token the session is first exchanged through `POST /auth/session`.
/// A failed exchange falls back to whatever session the backend already holds, so
/// only a failed `GET /auth/user` means the user is signed out.
pub async fn sign_in(
    fetchers: &Fetchers,
    access_token: Option<&str>,
) -> Result<UserSession, ApiError> {
    let mut user = establish(fetchers, access_token).await?;
    resolve_role(fetchers, &mut user).await;
    Ok(user)
}

/// Exchanges the token, if any, and loads the signed-in user. The role is left at its default.
pub async fn establish(
    fetchers: &Fetchers,
    access_token: Option<&str>,
) -> Result<UserSession, ApiError> {
    if let Some(token) = access_token {
        if let Err(e) = fetchers.sync_session(token).await {
            warn!("Session exchange failed, trying existing session: {}", e);
        }
    }
    Ok(UserSession::from(fetchers.current_user().await?))
}

/// Looks up the user's role. The user keeps their current role when the lookup fails.
pub async fn resolve_role(fetchers: &Fetchers, user: &mut UserSession) {
    match fetchers.fetch_role().await {
        Ok(role) => user.role = role,
        Err(e) => debug!("Keeping role {} for {}: {}", user.role, user.email, e),
    }
}

pub async fn sign_out(fetchers: &Fetchers) -> Result<(), ApiError> {
    fetchers.logout().await
}
