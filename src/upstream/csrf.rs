//! CSRF meta-tag extraction from the handshake page.
//!
//! The portal embeds two meta tags in its HTML:
//! `<meta name="_csrf" content="TOKEN">` and
//! `<meta name="_csrf_header" content="HEADER_NAME">`. The token must be
//! echoed back in the header named by the second tag. A string scan over the
//! meta tags is all this needs; the page is not otherwise interpreted.

const CSRF_TOKEN_META: &str = "_csrf";
const CSRF_HEADER_META: &str = "_csrf_header";

/// The token pair discovered during the handshake. Short-lived and
/// session-scoped; never reused across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
    header: String,
    token: String,
}

impl CsrfToken {
    /// Reads both CSRF meta tags from the handshake HTML. `None` if either
    /// tag is absent, in which case the data POST must not be attempted.
    pub fn extract(html: &str) -> Option<Self> {
        let token = meta_content(html, CSRF_TOKEN_META)?;
        let header = meta_content(html, CSRF_HEADER_META)?;
        Some(Self { header, token })
    }

    /// The header name under which the token is echoed back.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Finds `<meta name="{name}" ...>` and returns its `content` attribute.
/// Tag and attribute names are matched case-insensitively; attribute order
/// within the tag does not matter.
fn meta_content(html: &str, name: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let mut at = 0;
    while let Some(rel) = lower[at..].find("<meta") {
        let start = at + rel;
        let end = start + lower[start..].find('>')?;
        let tag = &html[start..end];
        if attr_value(tag, "name").as_deref() == Some(name) {
            return attr_value(tag, "content");
        }
        at = end + 1;
    }
    None
}

/// Returns the quoted value of `attr` within a single tag's text, accepting
/// either quote style.
fn attr_value(tag: &str, attr: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let needle = format!("{attr}=");
    let mut at = 0;
    while let Some(rel) = lower[at..].find(&needle) {
        let start = at + rel;
        // Reject matches inside a longer attribute name, e.g. `data-name=`.
        let boundary = start == 0
            || lower[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_whitespace());
        let value_at = start + needle.len();
        if boundary {
            let rest = &tag[value_at..];
            let quote = rest.chars().next()?;
            if quote == '"' || quote == '\'' {
                let inner = &rest[1..];
                let close = inner.find(quote)?;
                return Some(inner[..close].to_string());
            }
        }
        at = value_at;
    }
    None
}
