//! Modèle de données: utilisateurs, groupes, posts, commentaires et abonnements.
//!
//! Les entités se référencent par identifiant, jamais par pointeur.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::utils::{
    password_utils::PWHash,
    validation::{PostText, Slug, TextInput, Username},
};

/// Nombre de caractères affichés par la représentation textuelle d'un post
pub const POST_PREVIEW_CHARS: usize = 15;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Identifiant unique d'un utilisateur
    UserID
);
numeric_id!(
    /// Identifiant unique d'un groupe
    GroupID
);
numeric_id!(
    /// Identifiant unique d'un post, visible dans les URLs
    PostID
);
numeric_id!(
    /// Identifiant unique d'un commentaire
    CommentID
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserID,
    pub username: Username,
    pub password: PWHash,
    #[serde(default)]
    pub first_name: Option<TextInput>,
    #[serde(default)]
    pub last_name: Option<TextInput>,
}

impl User {
    /// "Prénom Nom" si renseigné, sinon le nom d'utilisateur
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [&self.first_name, &self.last_name]
            .into_iter()
            .flatten()
            .map(TextInput::as_str)
            .collect();

        if parts.is_empty() {
            self.username.to_string()
        } else {
            parts.join(" ")
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Une communauté thématique à laquelle un post peut être rattaché
#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("{title}")]
pub struct Group {
    pub id: GroupID,
    pub title: TextInput,
    pub slug: Slug,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostID,
    pub author: UserID,
    pub text: PostText,
    pub group: Option<GroupID>,
    /// Chemin de l'image relatif au dossier media, ex. `posts/<uuid>.gif`
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text.preview(POST_PREVIEW_CHARS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Display)]
#[display("{text}")]
pub struct Comment {
    pub id: CommentID,
    pub post: PostID,
    pub author: UserID,
    pub text: TextInput,
    pub created: DateTime<Utc>,
}

/// Abonnement de `user` aux posts de `author`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Follow {
    pub user: UserID,
    pub author: UserID,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str) -> Post {
        Post {
            id: PostID::from(1),
            author: UserID::from(1),
            text: PostText::new(text).unwrap(),
            group: None,
            image: None,
            pub_date: Utc::now(),
        }
    }

    #[test]
    fn test_post_display_is_first_fifteen_chars() {
        let post = post("Тестовый пост длиннее пятнадцати символов");
        assert_eq!(post.to_string(), "Тестовый пост д");
        assert_eq!(post.to_string().chars().count(), POST_PREVIEW_CHARS);
    }

    #[test]
    fn test_group_display_is_title() {
        let group = Group {
            id: GroupID::from(1),
            title: TextInput::new_short_form("Тестовая группа").unwrap(),
            slug: Slug::new("test-slug").unwrap(),
            description: "Тестовое описание".to_string(),
        };
        assert_eq!(group.to_string(), "Тестовая группа");
    }

    #[test]
    fn test_ids_parse_from_url_segments() {
        assert_eq!("42".parse::<PostID>().unwrap(), PostID::from(42));
        assert!("abc".parse::<PostID>().is_err());
        assert!("-1".parse::<PostID>().is_err());
    }
}
