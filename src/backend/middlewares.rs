//! Extracteur de l'utilisateur connecté.
//! Vérifie la session et rejette (redirection vers la connexion) les requêtes anonymes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::backend::state::AppState;
use crate::consts::SESSION_USER_KEY;
use crate::models::UserID;
use crate::utils::error_messages::AppError;
use crate::utils::validation::Username;

/// Utilisateur authentifié par sa session
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: UserID,
    pub username: Username,
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let (Some(session), Some(state)) = (
            parts.extensions.get::<Session>().cloned(),
            parts.extensions.get::<AppState>().cloned(),
        ) else {
            return Err(AppError::LoginRequired(next));
        };

        let Some(user_id) = session.get::<UserID>(SESSION_USER_KEY).await? else {
            return Err(AppError::LoginRequired(next));
        };

        // Le compte a pu disparaître depuis l'ouverture de la session
        let db = state.db.read().await;
        match db.get_user(user_id) {
            Ok(user) => Ok(SessionUser {
                id: user.id,
                username: user.username.clone(),
            }),
            Err(_) => Err(AppError::LoginRequired(next)),
        }
    }
}
