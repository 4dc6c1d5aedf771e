//! Session transport: the token rides in an HTTP-only cookie.
//!
//! `SameSite=None` obliges `Secure`, so browsers only send the cookie over TLS.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration as TimeDuration, OffsetDateTime};

pub const TOKEN_COOKIE: &str = "token";

fn session_cookie(value: String, expires: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .expires(expires)
        .build()
}

/// Sets the session cookie, expiring `ttl` from now.
pub fn attach(jar: CookieJar, token: &str, ttl: Duration) -> CookieJar {
    let ttl = TimeDuration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
    let expires = OffsetDateTime::now_utc().saturating_add(ttl);
    jar.add(session_cookie(token.to_owned(), expires))
}

/// Overwrites the session cookie with an empty, already-expired one.
pub fn clear(jar: CookieJar) -> CookieJar {
    jar.add(session_cookie(String::new(), OffsetDateTime::UNIX_EPOCH))
}

/// Token carried by the request, if any. An empty value counts as absent.
pub fn read(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::{http::header::SET_COOKIE, response::IntoResponse};

    use super::*;

    fn set_cookie_header(jar: CookieJar) -> String {
        let response = (jar, "ok").into_response();
        response
            .headers()
            .get(SET_COOKIE)
            .expect("set-cookie present")
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[test]
    fn attach_sets_all_session_attributes() {
        let header = set_cookie_header(attach(
            CookieJar::new(),
            "abc.def.ghi",
            Duration::from_secs(86_400),
        ));
        assert!(header.starts_with("token=abc.def.ghi"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=None"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Expires="));
    }

    #[test]
    fn attached_cookie_expires_one_ttl_out() {
        let jar = attach(CookieJar::new(), "t", Duration::from_secs(86_400));
        let expires = jar
            .get(TOKEN_COOKIE)
            .and_then(|c| c.expires_datetime())
            .unwrap();
        let delta = expires - OffsetDateTime::now_utc();
        assert!(delta.whole_hours() >= 23 && delta.whole_hours() <= 24);
    }

    #[test]
    fn attach_with_huge_ttl_saturates() {
        let jar = attach(CookieJar::new(), "t", Duration::from_secs(u64::MAX));
        assert!(jar.get(TOKEN_COOKIE).is_some());
    }

    #[test]
    fn clear_sets_empty_value_and_epoch_expiry() {
        let header = set_cookie_header(clear(CookieJar::new()));
        assert!(header.starts_with("token=;"));
        assert!(header.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=None"));
    }

    #[test]
    fn read_ignores_missing_and_empty_tokens() {
        assert_eq!(read(&CookieJar::new()), None);
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, ""));
        assert_eq!(read(&jar), None);
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "abc"));
        assert_eq!(read(&jar).as_deref(), Some("abc"));
    }
}
