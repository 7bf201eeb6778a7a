//! Yatube: plateforme de blogs avec groupes, commentaires et abonnements.

pub mod backend;
pub mod config;
pub mod consts;
pub mod database;
pub mod models;
pub mod utils;
