/// Account credentials, fixed for the lifetime of the client.
#[must_use]
#[derive(Clone, derive_more::Debug)]
pub struct Credentials {
    pub username: String,

    #[debug(skip)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

/// Client-side view of the portal session.
///
/// The cookie jar itself lives in the portal transport.
#[must_use]
#[derive(Copy, Clone, Debug, Default)]
pub struct Session {
    authenticated: bool,
}

impl Session {
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        self.authenticated
    }

    pub const fn authenticate(&mut self) {
        self.authenticated = true;
    }

    pub const fn invalidate(&mut self) {
        self.authenticated = false;
    }
}
