//! Stockage des données en mémoire, avec sauvegarde en YAML.
//!
//! Les contraintes d'intégrité (unicité des noms d'utilisateur et des slugs,
//! clés étrangères, règles d'abonnement) sont vérifiées ici, au moment de
//! l'écriture, et remontées sous forme de [`DBError`].

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs::{create_dir_all, File},
    io::ErrorKind::NotFound,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::models::{Comment, CommentID, Follow, Group, GroupID, Post, PostID, User, UserID};
use crate::utils::{
    password_utils::PWHash,
    validation::{PostText, Slug, TextInput, Username},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DBError {
    #[error("Invalid user ID: {0}")]
    InvalidUserID(UserID),
    #[error("Invalid group ID: {0}")]
    InvalidGroupID(GroupID),
    #[error("Invalid post ID: {0}")]
    InvalidPostID(PostID),
    #[error("User already exists: {0}")]
    UserAlreadyExists(Username),
    #[error("Group slug already in use: {0}")]
    SlugAlreadyExists(Slug),
    #[error("A user cannot follow themselves")]
    SelfFollow,
    #[error("Already following this author")]
    DuplicateFollow,
}

/// Données d'un post à créer, déjà validées par le formulaire
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author: UserID,
    pub text: PostText,
    pub group: Option<GroupID>,
    pub image: Option<String>,
}

/// Modification d'un post existant. `image: None` conserve l'image actuelle.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub text: PostText,
    pub group: Option<GroupID>,
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy)]
struct Sequences {
    user: u64,
    group: u64,
    post: u64,
    comment: u64,
}

#[derive(Serialize, Deserialize, Default)]
pub struct Database {
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(default)]
    sequences: Sequences,
    #[serde(default)]
    users: BTreeMap<UserID, User>,
    #[serde(default)]
    groups: BTreeMap<GroupID, Group>,
    #[serde(default)]
    posts: BTreeMap<PostID, Post>,
    #[serde(default)]
    comments: BTreeMap<CommentID, Comment>,
    #[serde(default)]
    follows: BTreeSet<(UserID, UserID)>,
}

impl Database {
    /// Base purement en mémoire, jamais écrite sur disque
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match File::open(&path) {
            Ok(f) => {
                let mut db: Self = serde_yaml::from_reader(f)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                db.check_integrity()
                    .with_context(|| format!("Integrity violation in {}", path.display()))?;
                db.path = Some(path);
                info!(
                    "Loaded {} users, {} groups, {} posts",
                    db.users.len(),
                    db.groups.len(),
                    db.posts.len()
                );
                Ok(db)
            }

            // Fichier non existant, on le crée
            Err(not_found) if not_found.kind() == NotFound => {
                info!("DB file not found, creating new empty DB");
                let db = Database {
                    path: Some(path),
                    ..Default::default()
                };
                db.save()?;
                Ok(db)
            }

            Err(other) => Err(other).with_context(|| format!("Failed to open {}", path.display())),
        }
    }

    /// Les contraintes vérifiées à l'écriture valent aussi pour un fichier chargé
    fn check_integrity(&self) -> Result<()> {
        for &(user, author) in &self.follows {
            if user == author {
                bail!("{}: user {user}", DBError::SelfFollow);
            }
            for id in [user, author] {
                if !self.users.contains_key(&id) {
                    bail!("Follow ({user}, {author}): {}", DBError::InvalidUserID(id));
                }
            }
        }

        for post in self.posts.values() {
            if !self.users.contains_key(&post.author) {
                bail!("Post {}: {}", post.id, DBError::InvalidUserID(post.author));
            }
            if let Some(group) = post.group.filter(|g| !self.groups.contains_key(g)) {
                bail!("Post {}: {}", post.id, DBError::InvalidGroupID(group));
            }
        }

        for comment in self.comments.values() {
            if !self.posts.contains_key(&comment.post) {
                bail!("Comment {}: {}", comment.id, DBError::InvalidPostID(comment.post));
            }
            if !self.users.contains_key(&comment.author) {
                bail!("Comment {}: {}", comment.id, DBError::InvalidUserID(comment.author));
            }
        }

        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent_dir) = Path::new(path).parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                create_dir_all(parent_dir).or(Err(anyhow!("Failed to create directory")))?;
            }
        }

        let file = File::create(path)?;
        serde_yaml::to_writer(file, self).or(Err(anyhow!("Failed to serialize DB")))?;
        Ok(())
    }

    /// Variante de [`Database::save`] pour les handlers: la sérialisation se
    /// fait sous le verrou, l'écriture passe par `tokio::fs` et ne bloque pas
    /// le runtime
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let yaml = serde_yaml::to_string(self).context("Failed to serialize DB")?;
        if let Some(parent_dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent_dir)
                .await
                .context("Failed to create directory")?;
        }
        tokio::fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("DB written to {}", path.display());
        Ok(())
    }

    // --- Utilisateurs ---

    pub fn create_user(
        &mut self,
        username: Username,
        password: PWHash,
        first_name: Option<TextInput>,
        last_name: Option<TextInput>,
    ) -> Result<UserID, DBError> {
        if self.lookup_username(username.as_str()).is_some() {
            return Err(DBError::UserAlreadyExists(username));
        }

        self.sequences.user += 1;
        let id = UserID::from(self.sequences.user);
        self.users.insert(
            id,
            User {
                id,
                username,
                password,
                first_name,
                last_name,
            },
        );
        Ok(id)
    }

    pub fn get_user(&self, user: UserID) -> Result<&User, DBError> {
        self.users.get(&user).ok_or(DBError::InvalidUserID(user))
    }

    pub fn lookup_username(&self, name: &str) -> Option<&User> {
        self.users.values().find(|user| user.username.as_str() == name)
    }

    // --- Groupes ---

    pub fn create_group(
        &mut self,
        title: TextInput,
        slug: Slug,
        description: &str,
    ) -> Result<GroupID, DBError> {
        if self.lookup_slug(slug.as_str()).is_some() {
            return Err(DBError::SlugAlreadyExists(slug));
        }

        self.sequences.group += 1;
        let id = GroupID::from(self.sequences.group);
        self.groups.insert(
            id,
            Group {
                id,
                title,
                slug,
                description: description.to_string(),
            },
        );
        Ok(id)
    }

    pub fn get_group(&self, group: GroupID) -> Result<&Group, DBError> {
        self.groups.get(&group).ok_or(DBError::InvalidGroupID(group))
    }

    pub fn lookup_slug(&self, slug: &str) -> Option<&Group> {
        self.groups.values().find(|group| group.slug.as_str() == slug)
    }

    pub fn list_groups(&self) -> impl Iterator<Item = &Group> + '_ {
        self.groups.values()
    }

    /// Supprime un groupe; ses posts restent, sans groupe
    pub fn delete_group(&mut self, group: GroupID) -> Result<Group, DBError> {
        let removed = self
            .groups
            .remove(&group)
            .ok_or(DBError::InvalidGroupID(group))?;

        for post in self.posts.values_mut() {
            if post.group == Some(group) {
                post.group = None;
            }
        }
        Ok(removed)
    }

    // --- Posts ---

    pub fn create_post(&mut self, new_post: NewPost) -> Result<PostID, DBError> {
        self.get_user(new_post.author)?;
        if let Some(group) = new_post.group {
            self.get_group(group)?;
        }

        self.sequences.post += 1;
        let id = PostID::from(self.sequences.post);
        self.posts.insert(
            id,
            Post {
                id,
                author: new_post.author,
                text: new_post.text,
                group: new_post.group,
                image: new_post.image,
                pub_date: Utc::now(),
            },
        );
        Ok(id)
    }

    pub fn update_post(&mut self, post: PostID, changes: PostChanges) -> Result<(), DBError> {
        if let Some(group) = changes.group {
            self.get_group(group)?;
        }

        let stored = self
            .posts
            .get_mut(&post)
            .ok_or(DBError::InvalidPostID(post))?;
        stored.text = changes.text;
        stored.group = changes.group;
        if let Some(image) = changes.image {
            stored.image = Some(image);
        }
        Ok(())
    }

    pub fn get_post(&self, post: PostID) -> Result<&Post, DBError> {
        self.posts.get(&post).ok_or(DBError::InvalidPostID(post))
    }

    /// Tous les posts, du plus récent au plus ancien
    pub fn list_posts(&self) -> Vec<&Post> {
        self.sorted_posts(|_| true)
    }

    pub fn posts_by_group(&self, group: GroupID) -> Vec<&Post> {
        self.sorted_posts(|post| post.group == Some(group))
    }

    pub fn posts_by_author(&self, author: UserID) -> Vec<&Post> {
        self.sorted_posts(|post| post.author == author)
    }

    /// Fil d'actualité: posts des auteurs suivis par `user`
    pub fn feed(&self, user: UserID) -> Vec<&Post> {
        let authors: BTreeSet<UserID> = self.followed_authors(user).collect();
        self.sorted_posts(|post| authors.contains(&post.author))
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    fn sorted_posts(&self, keep: impl Fn(&Post) -> bool) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.values().filter(|post| keep(post)).collect();
        // Plus récent d'abord; l'id départage les posts créés dans la même instant
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    // --- Commentaires ---

    pub fn add_comment(
        &mut self,
        post: PostID,
        author: UserID,
        text: TextInput,
    ) -> Result<CommentID, DBError> {
        self.get_post(post)?;
        self.get_user(author)?;

        self.sequences.comment += 1;
        let id = CommentID::from(self.sequences.comment);
        self.comments.insert(
            id,
            Comment {
                id,
                post,
                author,
                text,
                created: Utc::now(),
            },
        );
        Ok(id)
    }

    /// Commentaires d'un post, dans l'ordre de création
    pub fn comments_for(&self, post: PostID) -> impl Iterator<Item = &Comment> + '_ {
        self.comments.values().filter(move |comment| comment.post == post)
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    // --- Abonnements ---

    /// Enregistre l'abonnement de `user` à `author`.
    ///
    /// Refuse l'auto-abonnement et les doublons.
    pub fn follow(&mut self, user: UserID, author: UserID) -> Result<Follow, DBError> {
        self.get_user(user)?;
        self.get_user(author)?;

        if user == author {
            return Err(DBError::SelfFollow);
        }

        if !self.follows.insert((user, author)) {
            return Err(DBError::DuplicateFollow);
        }

        debug!("User {user} now follows {author}");
        Ok(Follow { user, author })
    }

    /// Retourne `true` si un abonnement a effectivement été supprimé
    pub fn unfollow(&mut self, user: UserID, author: UserID) -> bool {
        self.follows.remove(&(user, author))
    }

    pub fn is_following(&self, user: UserID, author: UserID) -> bool {
        self.follows.contains(&(user, author))
    }

    pub fn followed_authors(&self, user: UserID) -> impl Iterator<Item = UserID> + '_ {
        self.follows
            .range((user, UserID::from(0))..=(user, UserID::from(u64::MAX)))
            .map(|(_, author)| *author)
    }

    pub fn list_follows(&self) -> impl Iterator<Item = Follow> + '_ {
        self.follows
            .iter()
            .map(|&(user, author)| Follow { user, author })
    }

    pub fn follow_count(&self) -> usize {
        self.follows.len()
    }
}
