//! Option bags for the flow phases
//!
//! Immutable configuration with documented defaults; absent fields take the
//! default. Overrides chain through `with_*` methods.

use std::time::Duration;

/// Options for the start-authentication phase.
///
/// Defaults: scope `"openid"`, max_age 3600 seconds, acr_values `"2"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationOptions {
    scope: String,
    max_age: u64,
    acr_values: String,
    display: Option<String>,
    prompt: Option<String>,
    ui_locales: Option<String>,
}

impl Default for AuthenticationOptions {
    fn default() -> Self {
        Self {
            scope: "openid".to_string(),
            max_age: 3600,
            acr_values: "2".to_string(),
            display: None,
            prompt: None,
            ui_locales: None,
        }
    }
}

impl AuthenticationOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the requested scope (default `"openid"`).
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Override the maximum seconds since last user authentication
    /// (default 3600).
    #[must_use]
    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Override the requested Authentication Context class Reference
    /// (default `"2"`).
    #[must_use]
    pub fn with_acr_values(mut self, acr_values: impl Into<String>) -> Self {
        self.acr_values = acr_values.into();
        self
    }

    /// Set the OIDC `display` hint.
    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set the OIDC `prompt` value.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the OIDC `ui_locales` value.
    #[must_use]
    pub fn with_ui_locales(mut self, ui_locales: impl Into<String>) -> Self {
        self.ui_locales = Some(ui_locales.into());
        self
    }

    /// Requested scope.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Requested max_age in seconds.
    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Requested acr_values.
    pub fn acr_values(&self) -> &str {
        &self.acr_values
    }

    /// Requested display hint, if set.
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    /// Requested prompt, if set.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Requested ui_locales, if set.
    pub fn ui_locales(&self) -> Option<&str> {
        self.ui_locales.as_deref()
    }
}

/// Options for the token phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOptions {
    check_id_token_signature: bool,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            check_id_token_signature: true,
        }
    }
}

impl TokenOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Control whether the ID token signature is verified against the
    /// operator's JWK Set (default `true`).
    #[must_use]
    pub fn with_check_id_token_signature(mut self, check: bool) -> Self {
        self.check_id_token_signature = check;
        self
    }

    /// Whether ID token signature verification is requested.
    pub fn check_id_token_signature(&self) -> bool {
        self.check_id_token_signature
    }
}

/// Network-call timeout consumed by the transport collaborator.
///
/// Default: 30000 milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutOptions {
    timeout_ms: u64,
}

impl TimeoutOptions {
    /// Default timeout for a network call in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    /// Create options with the default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the timeout in milliseconds.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TimeoutOptions {
    fn default() -> Self {
        Self {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }
}
