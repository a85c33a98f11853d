use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};

use crate::{config::FlashConfig, state::AppState};

pub const COOKIE_NAME: &str = "flash";

/// Severity of a status message; doubles as the CSS class of the alert.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FlashClaims {
    level: FlashLevel,
    msg: String,
    exp: usize,
}

/// Signs and verifies the flash cookie.
#[derive(Clone)]
pub struct FlashKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDuration,
}

impl FlashKeys {
    pub fn new(config: &FlashConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: TimeDuration::seconds(config.ttl_seconds),
        }
    }

    pub fn sign(&self, flash: &Flash) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + self.ttl;
        let claims = FlashClaims {
            level: flash.level,
            msg: flash.message.clone(),
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(level = flash.level.as_str(), "flash signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Flash> {
        let data = decode::<FlashClaims>(token, &self.decoding, &Validation::default())?;
        Ok(Flash {
            level: data.claims.level,
            message: data.claims.msg,
        })
    }

    /// Redirect that carries `flash` to the next rendered page.
    pub fn redirect(&self, to: &str, flash: Flash) -> Response {
        let mut response = Redirect::to(to).into_response();
        let cookie = self.sign(&flash).and_then(|token| {
            HeaderValue::from_str(&format!(
                "{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax"
            ))
            .map_err(anyhow::Error::from)
        });
        match cookie {
            Ok(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            // The redirect still happens; only the message is lost.
            Err(e) => error!(error = %e, "flash cookie not set"),
        }
        response
    }
}

impl FromRef<AppState> for FlashKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.flash)
    }
}

/// Flash message queued by the previous response, if any.
#[derive(Debug, Default)]
pub struct IncomingFlash(pub Option<Flash>);

impl IncomingFlash {
    pub fn get(&self) -> Option<&Flash> {
        self.0.as_ref()
    }

    /// Wraps a rendered page; a consumed flash is cleared so it shows only once.
    pub fn render(self, body: String) -> Response {
        let mut response = Html(body).into_response();
        if self.0.is_some() {
            response.headers_mut().append(
                header::SET_COOKIE,
                HeaderValue::from_static("flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
            );
        }
        response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
    FlashKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, COOKIE_NAME) else {
            return Ok(Self(None));
        };
        let keys = FlashKeys::from_ref(state);
        match keys.verify(token) {
            Ok(flash) => Ok(Self(Some(flash))),
            Err(e) => {
                warn!(error = %e, "discarding invalid flash cookie");
                Ok(Self(None))
            }
        }
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}
