//! Structures de présentation passées aux templates.

use serde::Serialize;

use crate::database::Database;
use crate::models::{Comment, Group, Post};

/// URL du profil d'un auteur, nom encodé pour tenir dans un chemin
pub fn profile_url(username: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
    format!("/profile/{encoded}/")
}

#[derive(Serialize)]
pub struct GroupLink {
    pub title: String,
    pub slug: String,
    pub url: String,
}

impl From<&Group> for GroupLink {
    fn from(group: &Group) -> Self {
        Self {
            title: group.title.to_string(),
            slug: group.slug.to_string(),
            url: format!("/group/{}/", group.slug),
        }
    }
}

#[derive(Serialize)]
pub struct GroupView {
    pub id: u64,
    pub title: String,
    pub description: String,
}

impl From<&Group> for GroupView {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.get(),
            title: group.title.to_string(),
            description: group.description.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct PostView {
    pub id: u64,
    pub text: String,
    pub pub_date: String,
    pub author: String,
    pub author_full_name: String,
    pub author_url: String,
    pub group: Option<GroupLink>,
    pub image_url: Option<String>,
    pub url: String,
    pub edit_url: String,
}

impl PostView {
    pub fn new(post: &Post, db: &Database) -> Self {
        let (author, author_full_name) = match db.get_user(post.author) {
            Ok(user) => (user.username.to_string(), user.full_name()),
            Err(_) => (String::new(), String::new()),
        };

        Self {
            id: post.id.get(),
            text: post.text.to_string(),
            pub_date: post.pub_date.format("%d.%m.%Y %H:%M").to_string(),
            author_url: profile_url(&author),
            author,
            author_full_name,
            group: post
                .group
                .and_then(|group| db.get_group(group).ok())
                .map(GroupLink::from),
            image_url: post.image.as_ref().map(|image| format!("/media/{image}")),
            url: format!("/posts/{}/", post.id),
            edit_url: format!("/posts/{}/edit/", post.id),
        }
    }
}

#[derive(Serialize)]
pub struct CommentView {
    pub text: String,
    pub author: String,
    pub author_url: String,
    pub created: String,
}

impl CommentView {
    pub fn new(comment: &Comment, db: &Database) -> Self {
        let author = db
            .get_user(comment.author)
            .map(|user| user.username.to_string())
            .unwrap_or_default();

        Self {
            text: comment.text.to_string(),
            author_url: profile_url(&author),
            author,
            created: comment.created.format("%d.%m.%Y %H:%M").to_string(),
        }
    }
}
