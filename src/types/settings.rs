use serde::{Deserialize, Serialize};

/// URL shown on startup and highlighted in the sidebar.
pub const DEFAULT_URL: &str = "https://imallc.autodesk360.com/g/all_projects/active";

/// Top-level shell settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ShellSettings {
    pub window: WindowSettings,
    pub navigation: NavigationSettings,
    pub surfaces: SurfaceSettings,
    pub session: SessionSettings,
}

/// Main window settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "TaskaDeck".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

/// A link in the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavLink {
    pub label: String,
    pub url: String,
    /// Single glyph rendered as the link icon.
    pub icon: String,
}

/// Sidebar links and the startup destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationSettings {
    pub default_url: String,
    pub links: Vec<NavLink>,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_URL.to_string(),
            links: vec![
                NavLink {
                    label: "Projects".to_string(),
                    url: DEFAULT_URL.to_string(),
                    icon: "\u{25A6}".to_string(),
                },
                NavLink {
                    label: "Kanban".to_string(),
                    url: "taska://kanban".to_string(),
                    icon: "\u{25A4}".to_string(),
                },
            ],
        }
    }
}

/// Browsing surface cache and page tweaks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceSettings {
    /// Maximum number of live surfaces kept before the least recently shown is evicted.
    pub cache_capacity: usize,
    /// CSS selectors hidden in every page after it finishes loading.
    pub hidden_selectors: Vec<String>,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            cache_capacity: 8,
            hidden_selectors: vec![
                ".shopfloor-link".to_string(),
                ".flc-link".to_string(),
                "#fusion-header-fuison-link".to_string(),
            ],
        }
    }
}

impl SurfaceSettings {
    /// Stylesheet hiding every configured selector, or `None` when there are none.
    pub fn hidden_css(&self) -> Option<String> {
        let selectors: Vec<&str> = self
            .hidden_selectors
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if selectors.is_empty() {
            return None;
        }
        Some(format!("{} {{ display: none !important; }}", selectors.join(", ")))
    }
}

/// Shared cookie session settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Partition name. `persist:<name>` is kept on disk, anything else is in-memory.
    pub partition: String,
    pub flush_interval_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            partition: "persist:web-view".to_string(),
            flush_interval_secs: 30,
        }
    }
}
