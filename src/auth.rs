//! Login credential verification.
//!
//! The [`Authenticator`] trait is the substitution seam: handlers only ever
//! see `verify`, so a real scheme (password hashes, an identity provider)
//! can replace [`FixedCredentials`] without touching callers. Login grants
//! no session or token — every other endpoint is open by design.

/// Checks a username/password pair.
pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Constant-comparison authenticator holding a single credential pair.
#[derive(Debug, Clone)]
pub struct FixedCredentials {
    username: String,
    password: String,
}

impl FixedCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Authenticator for FixedCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}
