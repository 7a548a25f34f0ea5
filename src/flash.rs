//! One-shot notices carried to the next page in a signed cookie.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};

const FLASH_COOKIE: &str = "flash";

/// Keys the cookie jar from the session secret. Secrets shorter than 32 bytes
/// get a random per-process key, so notices do not survive a restart.
pub fn cookie_key(secret: &str) -> Key {
    if secret.len() >= 32 {
        Key::derive_from(secret.as_bytes())
    } else {
        tracing::warn!("SESSION_SECRET missing or shorter than 32 bytes - using a random key");
        Key::generate()
    }
}

pub fn set(jar: SignedCookieJar, message: &str) -> SignedCookieJar {
    let mut cookie = Cookie::new(FLASH_COOKIE, urlencoding::encode(message).into_owned());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    jar.add(cookie)
}

pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let message = urlencoding::decode(cookie.value()).ok().map(|m| m.into_owned());
    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/"));
    (jar, message)
}
