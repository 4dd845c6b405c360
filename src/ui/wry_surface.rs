//! `wry` child webviews as browsing surfaces.
//!
//! Every surface is a child webview of the main window built from one shared
//! [`WebContext`], so all of them see the same cookie partition. Engine
//! callbacks never touch shell state; they post [`UserEvent`]s to the event loop.

use std::path::PathBuf;
use std::rc::Rc;

use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{NewWindowResponse, PageLoadEvent, WebContext, WebView, WebViewBuilder};

use crate::managers::surface_registry::{Surface, SurfaceFactory};
use crate::types::cookie::StoredCookie;
use crate::types::errors::SurfaceError;
use crate::types::layout::Rect;
use crate::types::surface::{NavigationEvent, NavigationKind, SurfaceId};
use crate::ui::webview_app::UserEvent;

/// Installed in content surfaces. Reports history-API and hash navigation as
/// a bare nudge; the shell reads the location from the engine itself.
const LOCATION_NUDGE_JS: &str = r#"(function () {
  const nudge = () => { try { window.ipc.postMessage(''); } catch (_) {} };
  for (const name of ['pushState', 'replaceState']) {
    const original = history[name];
    history[name] = function () {
      const result = original.apply(this, arguments);
      nudge();
      return result;
    };
  }
  window.addEventListener('popstate', nudge);
  window.addEventListener('hashchange', nudge);
})();"#;

pub fn to_wry_rect(bounds: Rect) -> wry::Rect {
    wry::Rect {
        position: LogicalPosition::new(bounds.x as i32, bounds.y as i32).into(),
        size: LogicalSize::new(bounds.width, bounds.height).into(),
    }
}

fn operation_error(e: wry::Error) -> SurfaceError {
    SurfaceError::Operation(e.to_string())
}

pub struct WrySurfaceFactory {
    window: Rc<Window>,
    context: WebContext,
    proxy: EventLoopProxy<UserEvent>,
}

impl WrySurfaceFactory {
    /// `data_directory` is the session partition directory, `None` for in-memory.
    pub fn new(window: Rc<Window>, data_directory: Option<PathBuf>, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            window,
            context: WebContext::new(data_directory),
            proxy,
        }
    }

    /// Builds the trusted sidebar webview. It is the only webview with the
    /// boundary channel handler and bridge script.
    pub fn build_sidebar(&mut self, html: &str, bridge_js: &str, bounds: Rect) -> Result<WebView, SurfaceError> {
        let proxy = self.proxy.clone();
        WebViewBuilder::with_web_context(&mut self.context)
            .with_id("sidebar")
            .with_bounds(to_wry_rect(bounds))
            .with_html(html)
            .with_initialization_script(bridge_js)
            .with_ipc_handler(move |request: wry::http::Request<String>| {
                let _ = proxy.send_event(UserEvent::Boundary(request.body().clone()));
            })
            .with_new_window_req_handler(|_url, _features| NewWindowResponse::Deny)
            .with_devtools(cfg!(debug_assertions))
            .build_as_child(self.window.as_ref())
            .map_err(|e| SurfaceError::Creation(e.to_string()))
    }
}

impl SurfaceFactory for WrySurfaceFactory {
    type Surface = WrySurface;

    fn create_surface(&mut self, id: SurfaceId, bounds: Rect) -> Result<WrySurface, SurfaceError> {
        let webview_id = id.to_string();
        let load_proxy = self.proxy.clone();
        let nudge_proxy = self.proxy.clone();
        let popup_proxy = self.proxy.clone();

        let webview = WebViewBuilder::with_web_context(&mut self.context)
            .with_id(&webview_id)
            .with_bounds(to_wry_rect(bounds))
            .with_visible(false)
            .with_initialization_script(LOCATION_NUDGE_JS)
            .with_on_page_load_handler(move |event, url| {
                let kind = match event {
                    PageLoadEvent::Started => NavigationKind::Committed,
                    PageLoadEvent::Finished => NavigationKind::Finished,
                };
                let _ = load_proxy.send_event(UserEvent::Navigation(NavigationEvent::new(id, kind, url)));
            })
            .with_ipc_handler(move |_request: wry::http::Request<String>| {
                let _ = nudge_proxy.send_event(UserEvent::InPageNudge(id));
            })
            .with_new_window_req_handler(move |url, _features| {
                let _ = popup_proxy.send_event(UserEvent::Popup { surface: id, url });
                NewWindowResponse::Deny
            })
            .with_devtools(cfg!(debug_assertions))
            .build_as_child(self.window.as_ref())
            .map_err(|e| SurfaceError::Creation(e.to_string()))?;

        log::debug!("Built child webview {}", webview_id);
        Ok(WrySurface { webview })
    }
}

pub struct WrySurface {
    webview: WebView,
}

impl Surface for WrySurface {
    fn load_url(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.webview.load_url(url).map_err(operation_error)
    }

    fn set_bounds(&mut self, bounds: Rect) -> Result<(), SurfaceError> {
        self.webview.set_bounds(to_wry_rect(bounds)).map_err(operation_error)
    }

    fn set_attached(&mut self, attached: bool) -> Result<(), SurfaceError> {
        self.webview.set_visible(attached).map_err(operation_error)?;
        if attached {
            self.webview.focus().map_err(operation_error)?;
        }
        Ok(())
    }

    fn current_url(&self) -> Option<String> {
        self.webview.url().ok().filter(|url| !url.is_empty())
    }

    fn inject_css(&mut self, css: &str) -> Result<(), SurfaceError> {
        let css = serde_json::to_string(css).map_err(|e| SurfaceError::Operation(e.to_string()))?;
        let script = format!(
            "(function(){{const s=document.createElement('style');s.dataset.taskadeck='hidden';s.textContent={};(document.head||document.documentElement).appendChild(s);}})();",
            css
        );
        self.webview.evaluate_script(&script).map_err(operation_error)
    }

    fn reset_zoom(&mut self) -> Result<(), SurfaceError> {
        self.webview.zoom(1.0).map_err(operation_error)
    }

    fn cookies(&self) -> Result<Vec<StoredCookie>, SurfaceError> {
        let cookies = self.webview.cookies().map_err(operation_error)?;
        Ok(cookies
            .into_iter()
            .map(|cookie| StoredCookie {
                name: cookie.name().to_string(),
                domain: cookie.domain().unwrap_or_default().to_string(),
                path: cookie.path().unwrap_or("/").to_string(),
                raw: cookie.to_string(),
            })
            .collect())
    }

    fn teardown(self) {
        let _ = self.webview.set_visible(false);
        drop(self.webview);
    }
}
