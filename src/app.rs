//! App Core for TaskaDeck.
//!
//! Owns the presentation controller (and through it the registry and layout)
//! together with the shared session, and sequences startup and shutdown.
//! All methods run on the UI thread; nothing here is shared across threads.

use std::time::Duration;

use crate::boundary_channel;
use crate::managers::layout_controller::LayoutController;
use crate::managers::presentation_controller::PresentationController;
use crate::managers::surface_registry::{Reconciliation, SurfaceFactory, SurfaceRegistry};
use crate::services::session_store::{PeriodicTick, SessionStore, SessionStoreTrait};
use crate::services::url_resolver::UrlResolver;
use crate::types::errors::{BoundaryError, PresentationError};
use crate::types::layout::WindowSize;
use crate::types::settings::ShellSettings;
use crate::types::surface::{NavigationEvent, NavigationKind, SurfaceId};

/// Central application struct.
pub struct App<F: SurfaceFactory> {
    pub controller: PresentationController<F>,
    pub session: SessionStore,
    pub settings: ShellSettings,
}

impl<F: SurfaceFactory> App<F> {
    /// Wires a registry around `factory`, sized and styled from `settings`.
    pub fn new(factory: F, settings: ShellSettings, session: SessionStore, resolver: UrlResolver) -> Self {
        let registry = SurfaceRegistry::new(factory, settings.surfaces.cache_capacity);
        let layout = LayoutController::new(WindowSize::new(settings.window.width, settings.window.height));
        let controller = PresentationController::new(registry, layout, resolver)
            .with_injected_css(settings.surfaces.hidden_css());

        Self {
            controller,
            session,
            settings,
        }
    }

    /// Shows the configured startup destination.
    pub fn startup(&mut self) -> Result<SurfaceId, PresentationError> {
        let url = self.settings.navigation.default_url.clone();
        log::info!("Starting on {}", url);
        self.controller.show(&url)
    }

    /// Starts the session's backstop timer at the configured interval.
    pub fn start_periodic_flush(&mut self, tick: PeriodicTick) {
        let interval = Duration::from_secs(self.settings.session.flush_interval_secs);
        self.session.start_periodic_flush(interval, tick);
    }

    /// Handles one raw message from the sidebar.
    pub fn handle_boundary(&mut self, body: &str) -> Result<(), BoundaryError> {
        boundary_channel::handle_ipc(&mut self.controller, body)
    }

    /// Handles one navigation event. Finished loads also sync cookies, since
    /// logins land their cookies at that point.
    pub fn handle_navigation(&mut self, event: &NavigationEvent) -> Option<Reconciliation> {
        let outcome = self.controller.handle_navigation(event);
        if outcome.is_some() && event.kind == NavigationKind::Finished {
            self.sync_cookies();
        }
        outcome
    }

    pub fn resize(&mut self, window: WindowSize) {
        self.controller.resize(window);
    }

    /// Reads the shared session's cookies and records any changes.
    pub fn sync_cookies(&mut self) -> usize {
        match self.controller.registry().cookies_snapshot() {
            Some(cookies) => self.session.observe_snapshot(cookies),
            None => 0,
        }
    }

    /// Periodic backstop: sync, then flush whether or not anything changed.
    pub fn flush_session(&mut self) {
        self.sync_cookies();
        drop(self.session.flush());
    }

    /// Stops the timer, writes the jar synchronously and tears down every surface.
    pub fn shutdown(&mut self) {
        self.session.stop_periodic_flush();
        self.sync_cookies();
        if let Err(e) = self.session.flush_blocking() {
            log::error!("Final cookie flush failed: {}", e);
        }
        self.controller.shutdown();
        log::info!("Shutdown complete");
    }
}
