//! Module principal pour le backend de l'application.
//! Contient les gestionnaires pour les routes, les formulaires, les modèles
//! de présentation, le routeur, le cache et les middlewares.
pub mod cache;
pub mod forms;
pub mod handlers_auth;
pub mod handlers_unauth;
pub mod middlewares;
mod models;
pub mod paginator;
pub mod router;
pub mod state;
