//! Hachage et vérification des mots de passe

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHashString, PasswordVerifier, SaltString},
    Argon2, PasswordHasher,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use once_cell::sync::Lazy;

use crate::utils::validation::Password;

static DEFAULT_HASHER: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

/// Le hash d'un mot de passe vide, à utiliser quand l'utilisateur n'existe pas
/// pour éviter une attaque par canal auxiliaire
static EMPTY_HASH: Lazy<Option<PWHash>> = Lazy::new(|| hash_str("").ok());

/// Un mot de passe haché (format PHC)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PWHash(PasswordHashString);

impl fmt::Display for PWHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for PWHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PWHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let hash = PasswordHashString::from_str(&s)
            .map_err(|_| <D::Error as serde::de::Error>::custom("Invalid PHC string"))?;
        Ok(PWHash(hash))
    }
}

fn hash_str(password: &str) -> Result<PWHash, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2id with a fresh random salt
    let hash = DEFAULT_HASHER
        .hash_password(password.as_bytes(), &salt)?
        .serialize();

    Ok(PWHash(hash))
}

/// Calcule un haché a partir d'un mot de passe en clair, en choisissant un sel au hasard
pub fn hash(password: &Password) -> Result<PWHash, argon2::password_hash::Error> {
    hash_str(password.as_str())
}

/// Vérifie si le mot de passe correspond au hash stocké.
///
/// Si un hash n'est pas fourni, on teste quand même le mot de passe
/// avec un faux hash pour éviter une timing attack.
pub fn verify(password: &str, maybe_hash: Option<&PWHash>) -> bool {
    let found = maybe_hash.is_some();
    let Some(hash) = maybe_hash.or(EMPTY_HASH.as_ref()) else {
        return false;
    };

    let matches = DEFAULT_HASHER
        .verify_password(password.as_bytes(), &hash.0.password_hash())
        .is_ok();

    found && matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Username;

    fn password(raw: &str) -> Password {
        Password::new(raw, &Username::new("tester").unwrap()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash(&password("correct horse battery")).unwrap();
        assert!(verify("correct horse battery", Some(&hashed)));
        assert!(!verify("wrong horse battery", Some(&hashed)));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash(&password("same password")).unwrap();
        let b = hash(&password("same password")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_user_never_matches() {
        assert!(!verify("", None));
        assert!(!verify("anything at all", None));
    }

    #[test]
    fn test_serde_round_trip_keeps_phc_string() {
        let hashed = hash(&password("correct horse battery")).unwrap();
        let yaml = serde_yaml::to_string(&hashed).unwrap();
        let back: PWHash = serde_yaml::from_str(&yaml).unwrap();
        assert!(verify("correct horse battery", Some(&back)));
        assert!(serde_yaml::from_str::<PWHash>("not a phc string").is_err());
    }
}
