//! Turning stored landing-page bytes into markup text.
//!
//! Harvested pages arrive as raw bytes in whatever charset the site served.
//! A byte-order mark wins, then a `<meta>` charset declaration in the first
//! kilobyte, then UTF-8. PDF payloads that were stored in place of a landing
//! page are recognised so callers can build a null tree instead.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

/// `<meta charset="...">`
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>/;]+)"#).expect("valid regex")
});

/// `<meta http-equiv="Content-Type" content="text/html; charset=...">`
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

const SNIFF_LEN: usize = 1024;

/// Markup decoded from bytes, with the encoding that was used.
#[derive(Debug, Clone)]
pub struct DecodedMarkup {
    /// UTF-8 text.
    pub text: String,
    /// Encoding the bytes were read as.
    pub encoding: &'static Encoding,
    /// True if malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// True for payloads that are a PDF rather than HTML.
#[must_use]
pub fn is_pdf(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"%PDF-")
}

/// Charset declared in the page head, if any encoding_rs recognises.
#[must_use]
pub fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LEN)]);

    [&*CHARSET_META_RE, &*CONTENT_TYPE_CHARSET_RE]
        .iter()
        .filter_map(|re| re.captures(&head).and_then(|c| c.get(1)))
        .find_map(|m| Encoding::for_label(m.as_str().trim().as_bytes()))
}

/// Decode landing-page bytes to UTF-8.
///
/// Never fails: undecodable sequences become U+FFFD and `had_errors` is set.
#[must_use]
pub fn decode(bytes: &[u8]) -> DecodedMarkup {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedMarkup {
            text: text.into_owned(),
            encoding,
            had_errors,
        };
    }

    let encoding = declared_encoding(bytes).unwrap_or(UTF_8);
    // A page declaring utf-16 without a BOM is really ASCII-compatible; the
    // WHATWG rule is to read it as UTF-8.
    let encoding = encoding.output_encoding();
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    DecodedMarkup {
        text: text.into_owned(),
        encoding,
        had_errors,
    }
}
