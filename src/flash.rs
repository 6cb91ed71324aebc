//! One-shot notifications carried to the next rendered page.
//!
//! Messages ride on a signed cookie attached to the redirect response and are
//! removed by whichever page renders them first.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const FLASH_COOKIE: &str = "quill_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

/// Queue a message for the next page, keeping any already pending.
pub fn push(
    jar: SignedCookieJar,
    level: Level,
    text: impl Into<String>,
) -> Result<SignedCookieJar, AppError> {
    let mut messages = pending(&jar);
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });

    let value = serde_json::to_string(&messages)
        .map_err(|e| AppError::Internal(format!("Failed to serialize flash messages: {e}")))?;

    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok(jar.add(cookie))
}

/// Consume pending messages. The returned jar carries the cookie removal.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<FlashMessage>) {
    let messages = pending(&jar);
    if messages.is_empty() {
        return (jar, messages);
    }

    let cookie = Cookie::build((FLASH_COOKIE, "")).path("/").removal().build();
    (jar.remove(cookie), messages)
}

fn pending(jar: &SignedCookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    #[test]
    fn test_push_then_take() {
        let jar = SignedCookieJar::new(Key::generate());
        let jar = push(jar, Level::Success, "Added successfully.").unwrap();
        let jar = push(jar, Level::Info, "Second").unwrap();

        let (jar, messages) = take(jar);
        assert_eq!(
            messages,
            vec![
                FlashMessage {
                    level: Level::Success,
                    text: "Added successfully.".to_string()
                },
                FlashMessage {
                    level: Level::Info,
                    text: "Second".to_string()
                },
            ]
        );

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn test_flash_cookie_is_same_site_lax() {
        let jar = push(SignedCookieJar::new(Key::generate()), Level::Info, "Hi").unwrap();
        let cookie = jar.get(FLASH_COOKIE).unwrap();
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn test_take_on_empty_jar() {
        let (_, messages) = take(SignedCookieJar::new(Key::generate()));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Warning).unwrap(), "\"warning\"");
    }
}
