//! TaskaDeck UI layer.
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK (child webviews require X11)
//! - macOS: WKWebView
//!
//! The sidebar is HTML/CSS/JS inside a webview and talks to the shell over
//! the boundary channel. Content surfaces are plain child webviews.

pub mod webview_app;
pub mod wry_surface;
