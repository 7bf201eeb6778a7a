//! Définition des constantes globales pour l'application.

pub const HTTP_PORT: u16 = 8080; // Port par défaut pour le serveur HTTP.
pub const DB_PATH: &str = "./data/yatube.yaml"; // Chemin de la base de données.
pub const MEDIA_DIR: &str = "./data/media"; // Dossier des fichiers uploadés.
pub const TEMPLATES_DIR: &str = "templates/"; // Dossier des templates Handlebars.
pub const INDEX_CACHE_SECONDS: u64 = 20; // Durée de vie du cache de la page d'accueil.
pub const INDEX_CACHE_MAX_BYTES: u64 = 32 * 1024 * 1024; // Taille maximale du cache de pages.

pub const POSTS_PER_PAGE: usize = 10; // Nombre de posts par page.
pub const UPLOAD_DIR: &str = "posts"; // Sous-dossier media des images de posts.
pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024; // Taille maximale d'une requête.
pub const SESSION_USER_KEY: &str = "user_id"; // Clé de session de l'utilisateur connecté.
