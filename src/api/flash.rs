// One-shot status messages carried across a redirect in a cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "catalog_flash";

/// Messages to show on the next rendered list view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(message.into()),
        }
    }

    /// Stores the flash in `jar` for the next request
    pub fn store(&self, jar: CookieJar) -> CookieJar {
        let value = match serde_json::to_vec(self) {
            Ok(json) => URL_SAFE_NO_PAD.encode(json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode flash message");
                return jar;
            }
        };

        jar.add(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .build(),
        )
    }

    /// Reads and clears the pending flash, if any
    pub fn take(jar: CookieJar) -> (CookieJar, Flash) {
        let Some(cookie) = jar.get(FLASH_COOKIE) else {
            return (jar, Flash::default());
        };

        let flash = URL_SAFE_NO_PAD
            .decode(cookie.value())
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();

        (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
    }
}
