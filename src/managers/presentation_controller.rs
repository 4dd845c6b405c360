//! Presentation Controller for TaskaDeck.
//!
//! Decides which single surface is attached to the window. `show` resolves the
//! destination, finds or creates its surface, detaches the previous one and
//! attaches the target. Only the layout correction waits for a pending load;
//! attachment never does.

use std::collections::HashSet;

use crate::managers::layout_controller::LayoutController;
use crate::managers::surface_registry::{
    without_query, Located, Reconciliation, Surface, SurfaceFactory, SurfaceRegistry,
};
use crate::services::url_resolver::{UrlResolver, UrlResolverTrait};
use crate::types::errors::PresentationError;
use crate::types::layout::WindowSize;
use crate::types::surface::{NavigationEvent, NavigationKind, SurfaceId};

/// Presentation state. There is never more than one attached surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Idle,
    Attached(SurfaceId),
}

pub struct PresentationController<F: SurfaceFactory> {
    registry: SurfaceRegistry<F>,
    layout: LayoutController,
    resolver: UrlResolver,
    state: Presentation,
    deferred_layout: HashSet<SurfaceId>,
    injected_css: Option<String>,
}

impl<F: SurfaceFactory> PresentationController<F> {
    pub fn new(registry: SurfaceRegistry<F>, layout: LayoutController, resolver: UrlResolver) -> Self {
        Self {
            registry,
            layout,
            resolver,
            state: Presentation::Idle,
            deferred_layout: HashSet::new(),
            injected_css: None,
        }
    }

    /// Stylesheet injected into every surface when a load finishes.
    pub fn with_injected_css(mut self, css: Option<String>) -> Self {
        self.injected_css = css;
        self
    }

    pub fn state(&self) -> Presentation {
        self.state
    }

    pub fn attached(&self) -> Option<SurfaceId> {
        match self.state {
            Presentation::Idle => None,
            Presentation::Attached(id) => Some(id),
        }
    }

    pub fn registry(&self) -> &SurfaceRegistry<F> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SurfaceRegistry<F> {
        &mut self.registry
    }

    pub fn layout(&self) -> &LayoutController {
        &self.layout
    }

    pub fn resolver(&self) -> &UrlResolver {
        &self.resolver
    }

    /// Whether a layout correction is waiting for `id` to finish loading.
    pub fn is_layout_deferred(&self, id: SurfaceId) -> bool {
        self.deferred_layout.contains(&id)
    }

    /// Shows the surface for `url`, creating it if needed.
    ///
    /// An empty URL is rejected before anything is touched.
    pub fn show(&mut self, url: &str) -> Result<SurfaceId, PresentationError> {
        let url = url.trim();
        if url.is_empty() {
            log::debug!("Ignoring show() without a URL");
            return Err(PresentationError::EmptyUrl);
        }

        let resolved = self.resolver.resolve(url);
        let (target, located) = self.registry.locate(&resolved)?;
        self.forget_torn_down();

        if located != Located::Created {
            let drifted = self
                .registry
                .get(target)
                .map(|s| s.current_location())
                .filter(|live| without_query(live) != without_query(&resolved));
            if let Some(location) = drifted {
                log::info!("Surface {} drifted to {}, reloading {}", target, location, resolved);
                self.registry.load(target, &resolved);
            }
        }

        if let Presentation::Attached(current) = self.state {
            if current != target {
                self.set_attached(current, false);
                self.state = Presentation::Idle;
            }
        }

        self.set_attached(target, true);
        self.state = Presentation::Attached(target);
        self.registry.protect(Some(target));
        self.registry.touch(target);
        self.layout.apply_to_all(&mut self.registry);

        if self.registry.get(target).is_some_and(|s| s.is_loading()) {
            self.deferred_layout.insert(target);
        }

        log::info!("Showing {} in surface {} ({:?})", resolved, target, located);
        Ok(target)
    }

    /// Feeds one navigation event through the registry and reacts to it.
    pub fn handle_navigation(&mut self, event: &NavigationEvent) -> Option<Reconciliation> {
        let outcome = self.registry.reconcile(event)?;
        if let Some(displaced) = outcome.displaced {
            self.deferred_layout.remove(&displaced);
            if self.state == Presentation::Attached(displaced) {
                self.state = Presentation::Idle;
            }
        }

        let id = event.surface;
        if outcome.rekey.is_some() && self.state == Presentation::Attached(id) {
            // Re-attach after the key move in case the compositor raced the rename.
            self.set_attached(id, true);
            self.layout.apply_to_all(&mut self.registry);
        }

        match &event.kind {
            NavigationKind::Committed => {
                if let Some(entry) = self.registry.get_mut(id) {
                    if let Err(e) = entry.handle_mut().reset_zoom() {
                        log::debug!("Surface {}: zoom reset failed: {}", id, e);
                    }
                }
            }
            NavigationKind::Finished => {
                self.inject_css(id);
                self.settle_layout(id);
            }
            NavigationKind::Failed(_) => self.settle_layout(id),
            NavigationKind::InPage => {}
        }

        Some(outcome)
    }

    /// Loads `url` into an existing surface without changing presentation.
    pub fn load_in_surface(&mut self, id: SurfaceId, url: &str) -> bool {
        let loaded = self.registry.load(id, url);
        if loaded && self.state == Presentation::Attached(id) {
            self.deferred_layout.insert(id);
        }
        loaded
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.layout.set_sidebar_open(open);
        self.layout.apply_to_all(&mut self.registry);
        log::debug!("Sidebar {}, content bounds {:?}", if open { "open" } else { "closed" }, self.layout.bounds());
    }

    pub fn resize(&mut self, window: WindowSize) {
        self.layout.set_window_size(window);
        self.layout.apply_to_all(&mut self.registry);
    }

    /// Detaches everything and tears down every surface.
    pub fn shutdown(&mut self) {
        if let Presentation::Attached(current) = self.state {
            self.set_attached(current, false);
        }
        self.state = Presentation::Idle;
        self.deferred_layout.clear();
        self.registry.teardown_all();
    }

    fn set_attached(&mut self, id: SurfaceId, attached: bool) {
        if let Some(entry) = self.registry.get_mut(id) {
            if let Err(e) = entry.handle_mut().set_attached(attached) {
                log::warn!("Surface {}: attach={} failed: {}", id, attached, e);
            }
        }
    }

    fn inject_css(&mut self, id: SurfaceId) {
        let Some(css) = self.injected_css.as_deref() else {
            return;
        };
        if let Some(entry) = self.registry.get_mut(id) {
            if let Err(e) = entry.handle_mut().inject_css(css) {
                log::debug!("Surface {}: stylesheet not injected: {}", id, e);
            }
        }
    }

    fn settle_layout(&mut self, id: SurfaceId) {
        if self.deferred_layout.remove(&id) {
            self.layout.apply_to_all(&mut self.registry);
        }
    }

    fn forget_torn_down(&mut self) {
        let registry = &self.registry;
        self.deferred_layout.retain(|id| registry.contains(*id));
        if let Presentation::Attached(id) = self.state {
            if !registry.contains(id) {
                self.state = Presentation::Idle;
            }
        }
    }
}
