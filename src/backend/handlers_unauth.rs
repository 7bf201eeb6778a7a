//! Gestion des routes accessibles sans authentification.
//! Contient les handlers pour les listes de posts, le détail d'un post,
//! l'inscription, la connexion et la déconnexion.

use axum::{
    extract::{Form, Path, Query},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use handlebars::Handlebars;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use crate::backend::forms::{LoginForm, SignupForm};
use crate::backend::middlewares::SessionUser;
use crate::backend::models::{profile_url, CommentView, GroupView, PostView};
use crate::backend::paginator::paginate;
use crate::backend::state::AppState;
use crate::consts::{POSTS_PER_PAGE, SESSION_USER_KEY};
use crate::models::PostID;
use crate::utils::error_messages::{AppError, LOGIN_ERROR};
use crate::utils::password_utils::{hash, verify};

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Utilisateur affiché dans l'en-tête des pages
#[derive(Serialize)]
pub(crate) struct HeaderUser {
    username: String,
    profile_url: String,
}

pub(crate) fn header_user(user: &Option<SessionUser>) -> Option<HeaderUser> {
    user.as_ref().map(|user| HeaderUser {
        username: user.username.to_string(),
        profile_url: profile_url(user.username.as_str()),
    })
}

pub(crate) fn render(
    hbs: &Handlebars<'_>,
    name: &str,
    data: &serde_json::Value,
) -> Result<Html<String>, AppError> {
    Ok(Html(hbs.render(name, data)?))
}

/// Accepte uniquement un chemin local, sans schéma ni hôte
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(next)
            if next.starts_with('/')
                && !next.starts_with("//")
                && next.chars().all(|c| c.is_ascii_graphic()) =>
        {
            next.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Page d'accueil: tous les posts, mise en cache
pub async fn index(
    Extension(state): Extension<AppState>,
    user: Option<SessionUser>,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let cache_key = format!(
        "{}|{}",
        user.as_ref().map(|u| u.username.as_str()).unwrap_or_default(),
        uri
    );
    if let Some(body) = state.cache.get(&cache_key).await {
        return Ok(Html(body));
    }

    let db = state.db.read().await;
    let page = paginate(db.list_posts(), query.page.as_deref(), POSTS_PER_PAGE)
        .map(|post| PostView::new(post, &db));

    let Html(body) = render(
        &state.hbs,
        "index",
        &json!({ "user": header_user(&user), "page": page }),
    )?;
    state.cache.insert(cache_key, body.clone()).await;
    Ok(Html(body))
}

/// Posts d'un groupe
pub async fn group_list(
    Extension(state): Extension<AppState>,
    user: Option<SessionUser>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let db = state.db.read().await;
    let group = db.lookup_slug(&slug).ok_or(AppError::NotFound)?;

    let page = paginate(db.posts_by_group(group.id), query.page.as_deref(), POSTS_PER_PAGE)
        .map(|post| PostView::new(post, &db));

    render(
        &state.hbs,
        "group_list",
        &json!({
            "user": header_user(&user),
            "group": GroupView::from(group),
            "page": page,
        }),
    )
}

/// Profil d'un auteur et ses posts
pub async fn profile(
    Extension(state): Extension<AppState>,
    user: Option<SessionUser>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let db = state.db.read().await;
    let author = db.lookup_username(&username).ok_or(AppError::NotFound)?;

    let posts = db.posts_by_author(author.id);
    let post_count = posts.len();
    let page = paginate(posts, query.page.as_deref(), POSTS_PER_PAGE)
        .map(|post| PostView::new(post, &db));

    let can_follow = user.as_ref().is_some_and(|u| u.id != author.id);
    let following = user
        .as_ref()
        .is_some_and(|u| db.is_following(u.id, author.id));

    render(
        &state.hbs,
        "profile",
        &json!({
            "user": header_user(&user),
            "author": {
                "username": author.username.as_str(),
                "full_name": author.full_name(),
                "profile_url": profile_url(author.username.as_str()),
            },
            "post_count": post_count,
            "can_follow": can_follow,
            "following": following,
            "page": page,
        }),
    )
}

/// Détail d'un post avec ses commentaires
pub async fn post_detail(
    Extension(state): Extension<AppState>,
    user: Option<SessionUser>,
    Path(post_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let post_id: PostID = post_id.parse().map_err(|_| AppError::NotFound)?;

    let db = state.db.read().await;
    let post = db.get_post(post_id)?;
    let comments: Vec<CommentView> = db
        .comments_for(post_id)
        .map(|comment| CommentView::new(comment, &db))
        .collect();

    render(
        &state.hbs,
        "post_detail",
        &json!({
            "user": header_user(&user),
            "post": PostView::new(post, &db),
            "author_post_count": db.posts_by_author(post.author).len(),
            "is_author": user.as_ref().is_some_and(|u| u.id == post.author),
            "comments": comments,
        }),
    )
}

/// Affiche la page d'inscription
pub async fn signup_page(Extension(state): Extension<AppState>) -> Result<Html<String>, AppError> {
    render(&state.hbs, "signup", &json!({ "user": null }))
}

/// Crée un compte et ouvre la session
pub async fn signup(
    Extension(state): Extension<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let rerender = |errors: serde_json::Value| {
        render(
            &state.hbs,
            "signup",
            &json!({
                "user": null,
                "form": {
                    "username": form.username,
                    "first_name": form.first_name,
                    "last_name": form.last_name,
                },
                "errors": errors,
            }),
        )
        .map(IntoResponse::into_response)
    };

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return rerender(serde_json::to_value(errors).map_err(anyhow::Error::from)?),
    };

    let password = hash(&valid.password).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    let user_id = {
        let mut db = state.db.write().await;
        match db.create_user(valid.username, password, valid.first_name, valid.last_name) {
            Ok(id) => {
                db.persist().await?;
                id
            }
            Err(e) => {
                drop(db);
                return rerender(json!({ "username": e.to_string() }));
            }
        }
    };

    info!("Compte créé avec succès pour l'utilisateur {}", form.username.trim());
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, user_id).await?;
    Ok(Redirect::to("/").into_response())
}

/// Affiche la page de connexion
pub async fn login_page(
    Extension(state): Extension<AppState>,
    Query(query): Query<NextQuery>,
) -> Result<Html<String>, AppError> {
    let next: String = url::form_urlencoded::byte_serialize(
        safe_next(query.next.as_deref()).as_bytes(),
    )
    .collect();
    render(&state.hbs, "login", &json!({ "user": null, "next": next }))
}

/// Vérifie les identifiants et ouvre la session
pub async fn login(
    Extension(state): Extension<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(query.next.as_deref());

    let user_id = {
        let db = state.db.read().await;
        let user = db.lookup_username(form.username.trim());
        let valid = verify(&form.password, user.map(|u| &u.password));
        user.filter(|_| valid).map(|u| u.id)
    };

    let Some(user_id) = user_id else {
        let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
        return render(
            &state.hbs,
            "login",
            &json!({
                "user": null,
                "next": encoded,
                "username": form.username,
                "error": LOGIN_ERROR,
            }),
        )
        .map(IntoResponse::into_response);
    };

    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, user_id).await?;
    Ok(Redirect::to(&next).into_response())
}

/// Gère la déconnexion de l'utilisateur
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await?;
    Ok(Redirect::to("/"))
}

/// Page 404 pour toute route inconnue
pub async fn not_found() -> AppError {
    AppError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("/create/")), "/create/");
        assert_eq!(safe_next(Some("/follow/?page=2")), "/follow/?page=2");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("/profile/Гена/")), "/");
    }
}
