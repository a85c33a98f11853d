use anyhow::{bail, Context};
use tracing::warn;

const DEV_SECRET_KEY: &str = "dev-secret-key";

#[derive(Debug, Clone)]
pub struct FlashConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub flash: FlashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://users.db".into());

        let secret = match std::env::var("SECRET_KEY") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("SECRET_KEY not set; using the development key");
                DEV_SECRET_KEY.into()
            }
        };

        let flash = FlashConfig {
            secret,
            ttl_seconds: flash_ttl_seconds(std::env::var("FLASH_TTL_SECONDS").ok().as_deref())?,
        };

        Ok(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(5),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            flash,
        })
    }
}

/// Unset means 300. Anything else must be a positive integer; a zero or negative TTL
/// would expire every flash before the next page could show it.
fn flash_ttl_seconds(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(300);
    };
    let ttl = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("FLASH_TTL_SECONDS={raw:?} is not an integer"))?;
    if ttl <= 0 {
        bail!("FLASH_TTL_SECONDS must be positive, got {ttl}");
    }
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_ttl_defaults_when_unset() {
        assert_eq!(flash_ttl_seconds(None).unwrap(), 300);
    }

    #[test]
    fn flash_ttl_accepts_positive_values() {
        assert_eq!(flash_ttl_seconds(Some("45")).unwrap(), 45);
    }

    #[test]
    fn flash_ttl_rejects_zero_negative_and_garbage() {
        for raw in ["0", "-5", "soon"] {
            assert!(flash_ttl_seconds(Some(raw)).is_err(), "{raw} accepted");
        }
    }
}
