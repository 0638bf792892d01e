// API base address normalization.
//
// Users type addresses like `localhost:5171/api/` into the settings
// dialog; the client always works with `http://localhost:5171/api`.

use url::Url;

use crate::error::Error;

/// Address used when no preference has been stored.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5171/api";

/// Normalize a user-supplied API base address.
///
/// Trims whitespace, prepends `http://` when no scheme is given, and
/// strips trailing slashes from the path. The result never ends with `/`.
pub fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidBaseUrl {
            reason: "the API address cannot be empty".into(),
        });
    }

    let with_scheme = if has_scheme(trimmed) {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| Error::InvalidBaseUrl {
        reason: format!("{e}"),
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::InvalidBaseUrl {
            reason: format!("'{trimmed}' is not a valid address"),
        });
    }

    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Render a normalized address without the trailing slash `Url` adds
/// to an empty path.
pub fn display_base_url(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_owned()
}

fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
