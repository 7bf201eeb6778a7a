//! Formulaires: lecture des champs soumis et validation.
//!
//! Une erreur de validation n'est pas une erreur HTTP: le formulaire est
//! réaffiché avec les messages attachés à chaque champ.

use axum::body::Bytes;
use axum::extract::Multipart;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::backend::models::GroupView;
use crate::consts;
use crate::database::Database;
use crate::models::{GroupID, Post};
use crate::utils::error_messages::AppError;
use crate::utils::validation::{FileInput, Password, PostText, TextInput, Username};

/// Fichier brut reçu dans un champ multipart
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

/// Champs bruts du formulaire de post (`text`, `group`, `image`)
#[derive(Default)]
pub struct PostForm {
    pub text: String,
    pub group: String,
    pub image: Option<UploadedFile>,
}

#[derive(Debug, Default, Serialize)]
pub struct PostFormErrors {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<String>,
}

impl PostFormErrors {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.group.is_none() && self.image.is_none()
    }
}

/// Formulaire de post entièrement validé
pub struct ValidPostForm {
    pub text: PostText,
    pub group: Option<GroupID>,
    pub image: Option<FileInput>,
}

impl PostForm {
    /// Formulaire prérempli avec un post existant
    pub fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.to_string(),
            group: post.group.map(|g| g.to_string()).unwrap_or_default(),
            image: None,
        }
    }

    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = PostForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| AppError::MalformedPayload)?
        {
            let field_name = field.name().unwrap_or_default().to_string();
            match field_name.as_str() {
                "text" => {
                    form.text = field.text().await.map_err(|_| AppError::MalformedPayload)?;
                }
                "group" => {
                    form.group = field.text().await.map_err(|_| AppError::MalformedPayload)?;
                }
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let content = field.bytes().await.map_err(|_| AppError::MalformedPayload)?;

                    // Un champ fichier laissé vide est envoyé sans nom ni contenu
                    if !(filename.is_empty() && content.is_empty()) {
                        form.image = Some(UploadedFile { filename, content });
                    }
                }
                _ => continue, // Ignore unknown fields
            }
        }

        Ok(form)
    }

    pub fn validate(&self, db: &Database) -> Result<ValidPostForm, PostFormErrors> {
        let mut errors = PostFormErrors::default();

        let text = PostText::new(&self.text)
            .map_err(|e| errors.text = Some(e.to_string()))
            .ok();

        let group = match self.group.trim() {
            "" => None,
            raw => {
                let group = raw
                    .parse::<GroupID>()
                    .ok()
                    .filter(|id| db.get_group(*id).is_ok());
                if group.is_none() {
                    errors.group = Some(
                        "Select a valid choice. That choice is not one of the available choices."
                            .to_string(),
                    );
                }
                group
            }
        };

        let image = match &self.image {
            None => None,
            Some(upload) => FileInput::new(&upload.content, &upload.filename)
                .map_err(|e| errors.image = Some(e.to_string()))
                .ok(),
        };

        match text {
            Some(text) if errors.is_empty() => Ok(ValidPostForm { text, group, image }),
            _ => Err(errors),
        }
    }

    /// Contexte du template `create_post`
    pub fn context(&self, db: &Database, errors: &PostFormErrors) -> serde_json::Value {
        let groups: Vec<serde_json::Value> = db
            .list_groups()
            .map(|group| {
                let view = GroupView::from(group);
                serde_json::json!({
                    "id": view.id,
                    "title": view.title,
                    "selected": view.id.to_string() == self.group.trim(),
                })
            })
            .collect();

        serde_json::json!({
            "text": self.text,
            "groups": groups,
            "errors": errors,
        })
    }
}

/// Écrit l'image validée dans `media_dir/posts/` sous un nom unique
/// et retourne son chemin relatif au dossier media
pub async fn store_image(media_dir: &Path, file: &FileInput) -> std::io::Result<String> {
    let upload_dir = media_dir.join(consts::UPLOAD_DIR);
    tokio::fs::create_dir_all(&upload_dir).await?;

    let unique_filename = format!("{}.{}", Uuid::new_v4(), file.extension());
    tokio::fs::write(upload_dir.join(&unique_filename), file.content()).await?;

    Ok(format!("{}/{}", consts::UPLOAD_DIR, unique_filename))
}

/// Supprime une image écrite par [`store_image`] et jamais rattachée à un post
pub async fn discard_image(media_dir: &Path, stored: &str) {
    if let Err(e) = tokio::fs::remove_file(media_dir.join(stored)).await {
        warn!("Could not remove orphan upload {stored}: {e}");
    }
}

#[derive(Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn validate(&self) -> Option<TextInput> {
        TextInput::new_long_form(&self.text).ok()
    }
}

#[derive(Deserialize, Default)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SignupErrors {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct ValidSignup {
    pub username: Username,
    pub password: Password,
    pub first_name: Option<TextInput>,
    pub last_name: Option<TextInput>,
}

impl SignupForm {
    pub fn validate(&self) -> Result<ValidSignup, SignupErrors> {
        let mut errors = SignupErrors::default();

        let username = Username::new(&self.username)
            .map_err(|e| errors.username = Some(e.to_string()))
            .ok();

        let password = username.as_ref().and_then(|username| {
            Password::new(&self.password, username)
                .map_err(|e| errors.password = Some(e.to_string()))
                .ok()
        });

        let first_name = optional_name(&self.first_name, &mut errors.first_name);
        let last_name = optional_name(&self.last_name, &mut errors.last_name);

        match (username, password) {
            (Some(username), Some(password))
                if errors.first_name.is_none() && errors.last_name.is_none() =>
            {
                Ok(ValidSignup {
                    username,
                    password,
                    first_name,
                    last_name,
                })
            }
            _ => Err(errors),
        }
    }
}

fn optional_name(raw: &str, error: &mut Option<String>) -> Option<TextInput> {
    if raw.trim().is_empty() {
        return None;
    }
    TextInput::new_short_form(raw)
        .map_err(|e| *error = Some(e.to_string()))
        .ok()
}

#[derive(Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
