//! Login credentials type.

use std::fmt;

/// Login credentials for the backend's login route.
///
/// `domain` and `fingerprint` are optional on the wire and default to empty
/// strings.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use docapi_core::Credentials;
///
/// let creds = Credentials::new("dummy@test.com", "secret")
///     .with_domain("somewhere")
///     .with_fingerprint("ff78");
/// assert_eq!(creds.login(), "dummy@test.com");
/// assert_eq!(creds.domain(), "somewhere");
/// ```
#[derive(Clone)]
pub struct Credentials {
    login: String,
    password: String,
    domain: String,
    fingerprint: String,
}

impl Credentials {
    /// Create new credentials with an empty domain and fingerprint.
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            domain: String::new(),
            fingerprint: String::new(),
        }
    }

    /// Set the tenant domain to log in to.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the device fingerprint reported to the backend.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the login request. Never log it.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}
