//! URL helpers for link resolution and host checks.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

#[allow(clippy::expect_used)]
static JSESSIONID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";jsessionid=\w+").expect("JSESSIONID regex"));

/// Check if a string is an absolute http(s) URL with a host.
#[must_use]
pub fn is_absolute_url(s: &str) -> bool {
    let s = s.trim();
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return false;
    }
    Url::parse(s).is_ok_and(|url| url.host().is_some())
}

/// Remove `;jsessionid=...` path parameters, which change on every visit.
#[must_use]
pub fn strip_jsessionid(url: &str) -> String {
    JSESSIONID.replace_all(url, "").into_owned()
}

/// Resolve `href` against `base` after stripping session ids.
///
/// Returns the stripped href unchanged when there is no usable base.
#[must_use]
pub fn link_target(href: &str, base: Option<&str>) -> String {
    let href = strip_jsessionid(href.trim());
    match base.and_then(|b| Url::parse(b).ok()) {
        Some(base) => base
            .join(&href)
            .map_or(href, |resolved| resolved.to_string()),
        None => href,
    }
}

/// Lowercase hostname of a URL.
#[must_use]
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

/// True when the URL's host ends with `suffix`.
#[must_use]
pub fn host_ends_with(url: &str, suffix: &str) -> bool {
    hostname(url).is_some_and(|host| host.ends_with(suffix))
}

/// `scheme://host[:port]` of an absolute URL.
#[must_use]
pub fn origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    })
}

/// Query string of a URL, without the leading `?`.
#[must_use]
pub fn query(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.query().map(str::to_string))
}
