//! Outils transverses: erreurs, mots de passe et validation des entrées.

pub mod error_messages;
pub mod password_utils;
pub mod validation;
