//! Configuration des routes pour l'application.
//! Définit les routes accessibles avec ou sans authentification et configure les middlewares.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::backend::handlers_auth::{
    add_comment, follow_index, post_create, post_create_page, post_edit, post_edit_page,
    profile_follow, profile_unfollow,
};
use crate::backend::handlers_unauth::{
    group_list, index, login, login_page, logout, not_found, post_detail, profile, signup,
    signup_page,
};
use crate::backend::state::AppState;
use crate::consts::MAX_BODY_SIZE;

/// Initialisation du routeur principal et des middlewares
pub fn get_router(state: AppState) -> Router {
    // Sessions en mémoire, le cookie n'est pas accessible depuis JavaScript
    let session_manager = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_http_only(true);

    let router = Router::new()
        .merge(unauth_routes())
        .merge(auth_routes())
        .nest_service("/media", ServeDir::new(&state.config.media_dir))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(session_manager);

    // CORS permissif en mode debug uniquement
    let router = if cfg!(debug_assertions) {
        router.layer(
            CorsLayer::new()
                .allow_methods(tower_http::cors::AllowMethods::any())
                .allow_origin(Any),
        )
    } else {
        router
    };

    router.layer(Extension(state))
}

/// Routes accessibles sans authentification
fn unauth_routes() -> Router {
    Router::new()
        .route("/", get(index)) // Page d'accueil, mise en cache
        .route("/group/:slug/", get(group_list)) // Posts d'un groupe
        .route("/profile/:username/", get(profile)) // Profil d'un auteur
        .route("/posts/:post_id/", get(post_detail)) // Détail d'un post
        .route("/auth/signup/", get(signup_page).post(signup)) // Inscription
        .route("/auth/login/", get(login_page).post(login)) // Connexion
        .route("/auth/logout/", get(logout)) // Déconnexion
}

/// Routes nécessitant une authentification, l'extracteur `SessionUser`
/// redirige les invités vers la page de connexion
fn auth_routes() -> Router {
    Router::new()
        .route("/create/", get(post_create_page).post(post_create)) // Nouveau post
        .route("/posts/:post_id/edit/", get(post_edit_page).post(post_edit)) // Édition
        .route("/posts/:post_id/comment/", post(add_comment)) // Commentaire
        .route("/follow/", get(follow_index)) // Fil des abonnements
        .route("/profile/:username/follow/", get(profile_follow)) // Abonnement
        .route("/profile/:username/unfollow/", get(profile_unfollow)) // Désabonnement
}
