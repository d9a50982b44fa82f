use std::time::Duration;

/// Direct-hosted SMB.
pub const DEFAULT_PORT: u16 = 445;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the probing engine needs to know about a run.
///
/// Built once by the CLI and handed to the engine at construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Upper bound for connection establishment and for every
    /// request/response round trip on an open session.
    pub timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::anonymous(),
            timeout: DEFAULT_TIMEOUT,
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub domain: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain: String::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Empty user and password means a null session, never a client-side rejection.
    pub fn is_anonymous(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}
