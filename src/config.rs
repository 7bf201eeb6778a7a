//! Configuration chargée depuis l'environnement (et un éventuel fichier `.env`).

use anyhow::{Context, Result};
use log::{info, warn};
use std::{env, fmt::Debug, path::PathBuf, str::FromStr, time::Duration};

use crate::consts;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub index_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: consts::HTTP_PORT,
            db_path: PathBuf::from(consts::DB_PATH),
            media_dir: PathBuf::from(consts::MEDIA_DIR),
            templates_dir: PathBuf::from(consts::TEMPLATES_DIR),
            index_cache_ttl: Duration::from_secs(consts::INDEX_CACHE_SECONDS),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: try_load("YATUBE_PORT", defaults.port)?,
            db_path: try_load("YATUBE_DB_PATH", defaults.db_path)?,
            media_dir: try_load("YATUBE_MEDIA_DIR", defaults.media_dir)?,
            templates_dir: try_load("YATUBE_TEMPLATES_DIR", defaults.templates_dir)?,
            index_cache_ttl: Duration::from_secs(try_load(
                "YATUBE_INDEX_CACHE_SECS",
                defaults.index_cache_ttl.as_secs(),
            )?),
        })
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Debug,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(env::VarError::NotPresent) => {
            info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
        Err(e) => {
            warn!("Environment variable {key} unreadable ({e}), using default");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_load() {
        env::set_var("YATUBE_TEST_PORT", "9090");
        assert_eq!(try_load::<u16>("YATUBE_TEST_PORT", 1).unwrap(), 9090);

        env::set_var("YATUBE_TEST_BAD_PORT", "not a port");
        assert!(try_load::<u16>("YATUBE_TEST_BAD_PORT", 1).is_err());

        assert_eq!(try_load::<u16>("YATUBE_TEST_UNSET", 8080).unwrap(), 8080);
    }
}
