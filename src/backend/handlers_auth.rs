//! Gestion des routes nécessitant une authentification utilisateur.

use axum::{
    extract::{Form, Multipart, Path, Query},
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use log::{debug, info};
use serde_json::json;

use crate::backend::forms::{
    discard_image, store_image, CommentForm, PostForm, PostFormErrors, ValidPostForm,
};
use crate::backend::handlers_unauth::{header_user, render, PageQuery};
use crate::backend::middlewares::SessionUser;
use crate::backend::models::{profile_url, PostView};
use crate::backend::paginator::paginate;
use crate::backend::state::AppState;
use crate::consts::POSTS_PER_PAGE;
use crate::database::{DBError, NewPost, PostChanges};
use crate::models::PostID;
use crate::utils::error_messages::AppError;

fn parse_post_id(raw: &str) -> Result<PostID, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

fn post_url(post: PostID) -> String {
    format!("/posts/{post}/")
}

/// Affiche le formulaire, vierge ou avec les erreurs de validation
async fn render_post_form(
    state: &AppState,
    user: SessionUser,
    form: &PostForm,
    errors: &PostFormErrors,
    edited: Option<PostID>,
) -> Result<Html<String>, AppError> {
    let db = state.db.read().await;
    let action = match edited {
        Some(post) => format!("/posts/{post}/edit/"),
        None => "/create/".to_string(),
    };

    render(
        &state.hbs,
        "create_post",
        &json!({
            "user": header_user(&Some(user)),
            "form": form.context(&db, errors),
            "is_edit": edited.is_some(),
            "action": action,
        }),
    )
}

/// Valide le formulaire et écrit l'image éventuelle dans le dossier media
async fn accept_post_form(
    state: &AppState,
    form: &PostForm,
) -> Result<Result<(ValidPostForm, Option<String>), PostFormErrors>, AppError> {
    let valid = {
        let db = state.db.read().await;
        match form.validate(&db) {
            Ok(valid) => valid,
            Err(errors) => return Ok(Err(errors)),
        }
    };

    let image = match &valid.image {
        Some(file) => {
            let stored = store_image(&state.config.media_dir, file).await?;
            debug!("Stored upload {} as {stored}", file.filename());
            Some(stored)
        }
        None => None,
    };

    Ok(Ok((valid, image)))
}

/// Une image déjà écrite dont le post est refusé par la base ne doit pas rester
async fn discard_rejected_image<T>(
    media_dir: &std::path::Path,
    image: Option<&str>,
    stored: Result<T, DBError>,
) -> Result<T, DBError> {
    if let (Err(e), Some(image)) = (&stored, image) {
        debug!("Post refused ({e}), removing upload {image}");
        discard_image(media_dir, image).await;
    }
    stored
}

/// Formulaire de création d'un post
pub async fn post_create_page(
    Extension(state): Extension<AppState>,
    user: SessionUser,
) -> Result<Html<String>, AppError> {
    render_post_form(&state, user, &PostForm::default(), &PostFormErrors::default(), None).await
}

/// Crée un nouveau post avec texte, groupe et image optionnels
pub async fn post_create(
    Extension(state): Extension<AppState>,
    user: SessionUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = PostForm::from_multipart(multipart).await?;

    let (valid, image) = match accept_post_form(&state, &form).await? {
        Ok(accepted) => accepted,
        Err(errors) => {
            return render_post_form(&state, user, &form, &errors, None)
                .await
                .map(IntoResponse::into_response)
        }
    };

    let post_id = {
        let mut db = state.db.write().await;
        let created = db.create_post(NewPost {
            author: user.id,
            text: valid.text,
            group: valid.group,
            image: image.clone(),
        });
        let id = discard_rejected_image(&state.config.media_dir, image.as_deref(), created).await?;
        db.persist().await?;
        id
    };

    info!("Post {post_id} created by {}", user.username);
    Ok(Redirect::to(&profile_url(user.username.as_str())).into_response())
}

/// Formulaire d'édition, réservé à l'auteur
pub async fn post_edit_page(
    Extension(state): Extension<AppState>,
    user: SessionUser,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;

    let form = {
        let db = state.db.read().await;
        let post = db.get_post(post_id)?;
        if post.author != user.id {
            return Ok(Redirect::to(&post_url(post_id)).into_response());
        }
        PostForm::from_post(post)
    };

    render_post_form(&state, user, &form, &PostFormErrors::default(), Some(post_id))
        .await
        .map(IntoResponse::into_response)
}

/// Enregistre les modifications d'un post
pub async fn post_edit(
    Extension(state): Extension<AppState>,
    user: SessionUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let post_id = parse_post_id(&post_id)?;

    {
        let db = state.db.read().await;
        if db.get_post(post_id)?.author != user.id {
            return Ok(Redirect::to(&post_url(post_id)).into_response());
        }
    }

    let form = PostForm::from_multipart(multipart).await?;

    let (valid, image) = match accept_post_form(&state, &form).await? {
        Ok(accepted) => accepted,
        Err(errors) => {
            return render_post_form(&state, user, &form, &errors, Some(post_id))
                .await
                .map(IntoResponse::into_response)
        }
    };

    {
        let mut db = state.db.write().await;
        let updated = db.update_post(
            post_id,
            PostChanges {
                text: valid.text,
                group: valid.group,
                image: image.clone(),
            },
        );
        discard_rejected_image(&state.config.media_dir, image.as_deref(), updated).await?;
        db.persist().await?;
    }

    Ok(Redirect::to(&post_url(post_id)).into_response())
}

/// Ajoute un commentaire; un texte invalide est ignoré
pub async fn add_comment(
    Extension(state): Extension<AppState>,
    user: SessionUser,
    Path(post_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, AppError> {
    let post_id = parse_post_id(&post_id)?;

    let mut db = state.db.write().await;
    db.get_post(post_id)?;

    if let Some(text) = form.validate() {
        db.add_comment(post_id, user.id, text)?;
        db.persist().await?;
    }

    Ok(Redirect::to(&post_url(post_id)))
}

/// Fil des posts des auteurs suivis
pub async fn follow_index(
    Extension(state): Extension<AppState>,
    user: SessionUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let db = state.db.read().await;
    let page = paginate(db.feed(user.id), query.page.as_deref(), POSTS_PER_PAGE)
        .map(|post| PostView::new(post, &db));

    render(
        &state.hbs,
        "follow",
        &json!({ "user": header_user(&Some(user)), "page": page }),
    )
}

/// S'abonner à un auteur
pub async fn profile_follow(
    Extension(state): Extension<AppState>,
    user: SessionUser,
    Path(username): Path<String>,
) -> Result<Redirect, AppError> {
    let mut db = state.db.write().await;
    let author = db.lookup_username(&username).ok_or(AppError::NotFound)?.id;

    match db.follow(user.id, author) {
        Ok(_) => db.persist().await?,
        // Violations d'intégrité: rien à faire, on revient au profil
        Err(e @ (DBError::SelfFollow | DBError::DuplicateFollow)) => {
            debug!("Follow refused for {}: {e}", user.username)
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to(&profile_url(&username)))
}

/// Se désabonner d'un auteur
pub async fn profile_unfollow(
    Extension(state): Extension<AppState>,
    user: SessionUser,
    Path(username): Path<String>,
) -> Result<Redirect, AppError> {
    let mut db = state.db.write().await;
    let author = db.lookup_username(&username).ok_or(AppError::NotFound)?.id;

    if db.unfollow(user.id, author) {
        db.persist().await?;
    }

    Ok(Redirect::to(&profile_url(&username)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupID;
    use crate::utils::validation::{tests_support::SMALL_GIF, FileInput};

    #[tokio::test]
    async fn test_rejected_post_removes_its_upload() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileInput::new(SMALL_GIF, "small.gif").unwrap();
        let stored = store_image(dir.path(), &file).await.unwrap();

        let refused: Result<PostID, DBError> =
            Err(DBError::InvalidGroupID(GroupID::from(42)));
        let result = discard_rejected_image(dir.path(), Some(&stored), refused).await;
        assert_eq!(result, Err(DBError::InvalidGroupID(GroupID::from(42))));
        assert!(!dir.path().join(&stored).exists());
    }

    #[tokio::test]
    async fn test_accepted_post_keeps_its_upload() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileInput::new(SMALL_GIF, "small.gif").unwrap();
        let stored = store_image(dir.path(), &file).await.unwrap();

        let result = discard_rejected_image(dir.path(), Some(&stored), Ok(PostID::from(1))).await;
        assert_eq!(result, Ok(PostID::from(1)));
        assert!(dir.path().join(&stored).exists());
    }
}
