//! Desktop shell using `wry` + `tao`.
//!
//! Architecture:
//! - One tao window. The sidebar webview spans the whole window; content
//!   surfaces are child webviews laid over it to the right of the sidebar.
//! - Only the sidebar carries the boundary channel (`window.taskadeck`).
//! - Webview callbacks post [`UserEvent`]s; all shell state lives in the
//!   event-loop closure and is only touched on the UI thread.

use std::error::Error;
use std::rc::Rc;

use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tao::window::WindowBuilder;

use crate::app::App;
use crate::boundary_channel::BRIDGE_JS;
use crate::managers::surface_registry::Surface;
use crate::platform;
use crate::services::session_store::{SessionStore, SessionStoreTrait};
use crate::services::settings_engine::SettingsEngine;
use crate::services::url_resolver::UrlResolver;
use crate::types::layout::{Rect, WindowSize};
use crate::types::settings::ShellSettings;
use crate::types::surface::{NavigationEvent, NavigationKind, SurfaceId};
use crate::ui::wry_surface::{to_wry_rect, WrySurfaceFactory};

#[derive(Debug)]
pub enum UserEvent {
    /// Raw message from the sidebar.
    Boundary(String),
    Navigation(NavigationEvent),
    /// A content surface changed location without a document load.
    InPageNudge(SurfaceId),
    /// A content surface asked for a new window.
    Popup { surface: SurfaceId, url: String },
    FlushSession,
}

const SIDEBAR_HTML: &str = include_str!("../../resources/ui/sidebar.html");
const SIDEBAR_CSS: &str = include_str!("../../resources/ui/sidebar.css");
const SIDEBAR_JS: &str = include_str!("../../resources/ui/sidebar.js");

/// Sidebar page with styles, script and the configured links inlined.
pub fn sidebar_html(settings: &ShellSettings) -> String {
    let links = serde_json::to_string(&settings.navigation.links).unwrap_or_else(|_| "[]".to_string());
    let boot = format!(
        "window.__taskadeck_links={};window.__taskadeck_default={};",
        links,
        serde_json::to_string(&settings.navigation.default_url).unwrap_or_else(|_| "\"\"".to_string())
    );
    SIDEBAR_HTML
        .replace("/*SIDEBAR_CSS*/", SIDEBAR_CSS)
        .replace("/*SIDEBAR_BOOT*/", &boot)
        .replace("/*SIDEBAR_JS*/", SIDEBAR_JS)
}

fn full_window(size: WindowSize) -> Rect {
    Rect::new(0, 0, size.width, size.height)
}

// ─── Main entry point ───

pub fn run() -> Result<(), Box<dyn Error>> {
    let settings = SettingsEngine::new(None).load_or_default();
    let runtime = tokio::runtime::Runtime::new()?;
    let session = SessionStore::init(
        &settings.session.partition,
        &platform::get_data_dir(),
        runtime.handle().clone(),
    )?;

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = Rc::new(
        WindowBuilder::new()
            .with_title(settings.window.title.as_str())
            .with_inner_size(tao::dpi::LogicalSize::new(settings.window.width, settings.window.height))
            .build(&event_loop)?,
    );

    let mut factory = WrySurfaceFactory::new(
        window.clone(),
        session.data_directory().map(|dir| dir.to_path_buf()),
        proxy.clone(),
    );
    let window_size = WindowSize::new(settings.window.width, settings.window.height);
    let sidebar = factory.build_sidebar(&sidebar_html(&settings), BRIDGE_JS, full_window(window_size))?;

    let mut app = App::new(factory, settings, session, UrlResolver::from_install_layout());
    if let Err(e) = app.startup() {
        log::error!("Startup navigation failed: {}", e);
    }

    let tick_proxy = proxy.clone();
    app.start_periodic_flush(Box::new(move || {
        let _ = tick_proxy.send_event(UserEvent::FlushSession);
    }));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        // Keeps the flush runtime alive for the life of the loop.
        let _ = &runtime;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                app.shutdown();
                *control_flow = ControlFlow::Exit;
            }

            Event::WindowEvent {
                event: WindowEvent::Resized(physical),
                ..
            } => {
                let logical = physical.to_logical::<u32>(window.scale_factor());
                let size = WindowSize::new(logical.width, logical.height);
                if let Err(e) = sidebar.set_bounds(to_wry_rect(full_window(size))) {
                    log::warn!("Sidebar bounds not applied: {}", e);
                }
                app.resize(size);
            }

            Event::UserEvent(user_event) => match user_event {
                UserEvent::Boundary(body) => {
                    if let Err(e) = app.handle_boundary(&body) {
                        log::warn!("Rejected boundary message: {}", e);
                    }
                }
                UserEvent::Navigation(nav) => {
                    log::debug!("{:?} {} ({})", nav.kind, nav.url, nav.surface);
                    app.handle_navigation(&nav);
                }
                UserEvent::InPageNudge(id) => {
                    let url = app
                        .controller
                        .registry()
                        .get(id)
                        .and_then(|s| s.handle().current_url());
                    if let Some(url) = url {
                        app.handle_navigation(&NavigationEvent::new(id, NavigationKind::InPage, url));
                    }
                }
                UserEvent::Popup { surface, url } => {
                    log::info!("Loading popup {} in surface {}", url, surface);
                    app.controller.load_in_surface(surface, &url);
                }
                UserEvent::FlushSession => app.flush_session(),
            },

            _ => {}
        }
    })
}
