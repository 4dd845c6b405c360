use serde::{Deserialize, Serialize};

/// A cookie as kept in the session jar.
///
/// `raw` is the cookie's serialized form exactly as the webview engine reported
/// it. The shell never parses it; `name`, `domain` and `path` only identify the
/// cookie inside the jar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub domain: String,
    pub path: String,
    pub raw: String,
}

impl StoredCookie {
    pub fn key(&self) -> CookieKey {
        CookieKey {
            name: self.name.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
        }
    }
}

/// Identity of a cookie within the jar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CookieKey {
    pub name: String,
    pub domain: String,
    pub path: String,
}

/// A single mutation of the shared cookie jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieChange {
    pub cookie: StoredCookie,
    pub removed: bool,
}
