//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in seconds (default: 604_800 = 7 days).
    /// Every authenticated request slides the expiry forward by this
    /// amount.
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 604_800,
            pepper: None,
            min_password_length: 8,
        }
    }
}
