use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

const FLASH_COOKIE: &str = "cinelog_flash";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

/// Queue a one-shot notice for the next rendered page.
pub fn push(jar: CookieJar, level: Level, text: impl Into<String>) -> CookieJar {
    let mut messages = peek(&jar);
    messages.push(Message { level, text: text.into() });
    let payload = serde_json::to_string(&messages).unwrap_or_default();
    jar.add(
        Cookie::build((FLASH_COOKIE, urlencoding::encode(&payload).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

/// Drain queued notices, clearing the cookie when any were present.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Message>) {
    let messages = peek(&jar);
    let jar = if messages.is_empty() {
        jar
    } else {
        jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build())
    };
    (jar, messages)
}

fn peek(jar: &CookieJar) -> Vec<Message> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| urlencoding::decode(c.value()).ok())
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_take_round_trips() {
        let jar = CookieJar::new();
        let jar = push(jar, Level::Success, "saved");
        let jar = push(jar, Level::Error, "but also this");

        let (_, messages) = take(jar);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, Level::Success);
        assert_eq!(messages[0].text, "saved");
        assert_eq!(messages[1].level, Level::Error);
    }

    #[test]
    fn take_on_empty_jar_is_empty() {
        let (_, messages) = take(CookieJar::new());
        assert!(messages.is_empty());
    }
}
