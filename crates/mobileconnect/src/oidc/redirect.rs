//! Redirect URL parsing (phase 2)

use url::Url;

use super::OidcError;

const COMPONENTS: [&str; 5] = ["error", "error_description", "error_uri", "state", "code"];

/// The authorization components extracted from a redirect URL.
///
/// Exposes whichever of `error`, `error_description`, `error_uri`, `state`
/// and `code` were present; at least one of `code` or `error` is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedAuthenticationResponse {
    error: Option<String>,
    error_description: Option<String>,
    error_uri: Option<String>,
    state: Option<String>,
    code: Option<String>,
}

impl ParsedAuthenticationResponse {
    /// The operator's `error` code, if authentication failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Human-readable failure description, if present.
    pub fn error_description(&self) -> Option<&str> {
        self.error_description.as_deref()
    }

    /// URI with more failure detail, if present.
    pub fn error_uri(&self) -> Option<&str> {
        self.error_uri.as_deref()
    }

    /// The echoed state value, if present.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The authorization code, if authentication succeeded.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "error" => self.error = Some(value),
            "error_description" => self.error_description = Some(value),
            "error_uri" => self.error_uri = Some(value),
            "state" => self.state = Some(value),
            "code" => self.code = Some(value),
            _ => {}
        }
    }

    fn is_empty(&self) -> bool {
        self.error.is_none()
            && self.error_description.is_none()
            && self.error_uri.is_none()
            && self.state.is_none()
            && self.code.is_none()
    }
}

/// Parse a redirect URL into its authorization components.
///
/// Components are read from the query string, falling back to the fragment
/// when the query carries none of them (some operators deliver via
/// fragment). Percent- and plus-decoding follow normal query semantics.
pub(crate) fn parse(redirect_url: &str) -> Result<ParsedAuthenticationResponse, OidcError> {
    let url = Url::parse(redirect_url)
        .map_err(|e| OidcError::protocol(format!("unparseable redirect URL: {e}")))?;

    let mut parsed = ParsedAuthenticationResponse::default();
    for (name, value) in url.query_pairs() {
        if COMPONENTS.contains(&name.as_ref()) {
            parsed.set(&name, value.into_owned());
        }
    }

    if parsed.is_empty()
        && let Some(fragment) = url.fragment()
    {
        for (name, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            if COMPONENTS.contains(&name.as_ref()) {
                parsed.set(&name, value.into_owned());
            }
        }
    }

    if parsed.code.is_none() && parsed.error.is_none() {
        return Err(OidcError::protocol(
            "redirect URL carries neither a code nor an error",
        ));
    }

    Ok(parsed)
}
