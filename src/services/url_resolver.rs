// TaskaDeck URL Resolver
// Maps `taska://` identifiers to loadable locations; everything else passes through.

use std::path::{Path, PathBuf};

use url::Url;

use crate::platform;

/// Custom scheme prefix handled by the resolver.
pub const CUSTOM_SCHEME: &str = "taska://";

/// Identifier of the bundled kanban page.
pub const KANBAN_URL: &str = "taska://kanban";

const KANBAN_FILE: &str = "kanban.html";

/// Outcome of resolving one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    /// True when no candidate existed and the first one was used as a best guess.
    pub fallback: bool,
}

/// Trait defining the URL resolver interface.
pub trait UrlResolverTrait {
    fn resolve(&self, input: &str) -> String;
    fn resolve_detailed(&self, input: &str) -> Resolution;
}

/// Resolver probing an ordered list of kanban page locations.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    kanban_candidates: Vec<PathBuf>,
}

impl UrlResolver {
    /// Creates a resolver with explicit kanban candidates, probed in order.
    pub fn new(kanban_candidates: Vec<PathBuf>) -> Self {
        Self { kanban_candidates }
    }

    /// Resolver for the standard install layouts:
    /// 1. development: `<crate>/resources/kanban.html`
    /// 2. packaged: `<exe dir>/resources/kanban.html`
    /// 3. alternate packaged (macOS bundle): `<exe dir>/../Resources/kanban.html`
    pub fn from_install_layout() -> Self {
        let mut candidates = vec![Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("resources")
            .join(KANBAN_FILE)];
        if let Some(exe_dir) = platform::executable_dir() {
            candidates.push(exe_dir.join("resources").join(KANBAN_FILE));
            candidates.push(exe_dir.join("..").join("Resources").join(KANBAN_FILE));
        }
        Self::new(candidates)
    }

    pub fn kanban_candidates(&self) -> &[PathBuf] {
        &self.kanban_candidates
    }

    fn resolve_kanban(&self) -> Resolution {
        if let Some(found) = self.kanban_candidates.iter().find(|p| p.is_file()) {
            log::debug!("Found kanban page at {}", found.display());
            return Resolution {
                url: file_url(found),
                fallback: false,
            };
        }

        match self.kanban_candidates.first() {
            Some(first) => {
                log::warn!(
                    "Kanban page not found in {} candidate location(s), using fallback {}",
                    self.kanban_candidates.len(),
                    first.display()
                );
                Resolution {
                    url: file_url(first),
                    fallback: true,
                }
            }
            None => {
                log::warn!("No kanban candidates configured, leaving {} unresolved", KANBAN_URL);
                Resolution {
                    url: KANBAN_URL.to_string(),
                    fallback: true,
                }
            }
        }
    }
}

impl Default for UrlResolver {
    fn default() -> Self {
        Self::from_install_layout()
    }
}

impl UrlResolverTrait for UrlResolver {
    fn resolve(&self, input: &str) -> String {
        self.resolve_detailed(input).url
    }

    fn resolve_detailed(&self, input: &str) -> Resolution {
        if !input.starts_with(CUSTOM_SCHEME) {
            return Resolution {
                url: input.to_string(),
                fallback: false,
            };
        }
        if input == KANBAN_URL {
            return self.resolve_kanban();
        }
        log::debug!("Unrecognized custom identifier {}, passing through", input);
        Resolution {
            url: input.to_string(),
            fallback: false,
        }
    }
}

/// Builds a `file://` URL with `/` separators on every host OS.
pub fn file_url(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match Url::from_file_path(&absolute) {
        Ok(url) => url.to_string(),
        Err(()) => {
            let normalized = absolute.to_string_lossy().replace('\\', "/");
            if normalized.starts_with('/') {
                format!("file://{}", normalized)
            } else {
                format!("file:///{}", normalized)
            }
        }
    }
}
