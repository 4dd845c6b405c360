//! In-process surface backend without a rendering engine.
//!
//! Backs the console build and the test suite. Surfaces record what the shell
//! asks of them, and a [`HeadlessProbe`] reads that record and injects the
//! navigation events a real engine would report.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::managers::surface_registry::{Surface, SurfaceFactory};
use crate::types::cookie::StoredCookie;
use crate::types::errors::SurfaceError;
use crate::types::layout::Rect;
use crate::types::surface::{NavigationEvent, NavigationKind, SurfaceId};

/// Everything a headless surface has been asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    pub loads: Vec<String>,
    pub location: Option<String>,
    pub attached: bool,
    pub bounds: Option<Rect>,
    pub injected_css: Vec<String>,
    pub zoom_resets: usize,
    pub torn_down: bool,
}

#[derive(Default)]
struct Shared {
    surfaces: HashMap<SurfaceId, SurfaceState>,
    created: Vec<SurfaceId>,
    events: VecDeque<NavigationEvent>,
    cookies: Vec<StoredCookie>,
    fail_creation: bool,
    auto_complete: bool,
}

/// Read/inject handle onto the surfaces of one [`HeadlessFactory`].
#[derive(Clone, Default)]
pub struct HeadlessProbe {
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessProbe {
    pub fn state(&self, id: SurfaceId) -> Option<SurfaceState> {
        self.shared.borrow().surfaces.get(&id).cloned()
    }

    /// Every surface ever created, in creation order.
    pub fn created(&self) -> Vec<SurfaceId> {
        self.shared.borrow().created.clone()
    }

    /// Surfaces not yet torn down, in creation order.
    pub fn live(&self) -> Vec<SurfaceId> {
        let shared = self.shared.borrow();
        shared
            .created
            .iter()
            .copied()
            .filter(|id| shared.surfaces.get(id).is_some_and(|s| !s.torn_down))
            .collect()
    }

    /// Live surfaces currently attached to the window.
    pub fn attached(&self) -> Vec<SurfaceId> {
        let shared = self.shared.borrow();
        shared
            .created
            .iter()
            .copied()
            .filter(|id| shared.surfaces.get(id).is_some_and(|s| s.attached && !s.torn_down))
            .collect()
    }

    /// Moves a surface to `url` as the engine would and queues the matching event.
    pub fn navigate(&self, id: SurfaceId, kind: NavigationKind, url: &str) -> NavigationEvent {
        let mut shared = self.shared.borrow_mut();
        if kind.settles_location() {
            if let Some(state) = shared.surfaces.get_mut(&id) {
                state.location = Some(url.to_string());
            }
        }
        let event = NavigationEvent::new(id, kind, url);
        shared.events.push_back(event.clone());
        event
    }

    pub fn drain_events(&self) -> Vec<NavigationEvent> {
        self.shared.borrow_mut().events.drain(..).collect()
    }

    pub fn set_cookies(&self, cookies: Vec<StoredCookie>) {
        self.shared.borrow_mut().cookies = cookies;
    }

    pub fn fail_creation(&self, fail: bool) {
        self.shared.borrow_mut().fail_creation = fail;
    }
}

/// Creates [`HeadlessSurface`]s.
#[derive(Default)]
pub struct HeadlessFactory {
    probe: HeadlessProbe,
}

impl HeadlessFactory {
    /// Loads stay pending until events are injected through the probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every load immediately queues `Committed` and `Finished` events.
    pub fn auto_completing() -> Self {
        let factory = Self::default();
        factory.probe.shared.borrow_mut().auto_complete = true;
        factory
    }

    pub fn probe(&self) -> HeadlessProbe {
        self.probe.clone()
    }
}

impl SurfaceFactory for HeadlessFactory {
    type Surface = HeadlessSurface;

    fn create_surface(&mut self, id: SurfaceId, bounds: Rect) -> Result<HeadlessSurface, SurfaceError> {
        let mut shared = self.probe.shared.borrow_mut();
        if shared.fail_creation {
            return Err(SurfaceError::Creation("headless creation disabled".to_string()));
        }
        shared.created.push(id);
        shared.surfaces.insert(
            id,
            SurfaceState {
                bounds: Some(bounds),
                ..SurfaceState::default()
            },
        );
        Ok(HeadlessSurface {
            id,
            shared: self.probe.shared.clone(),
        })
    }
}

pub struct HeadlessSurface {
    id: SurfaceId,
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessSurface {
    fn with_state<T>(&self, f: impl FnOnce(&mut SurfaceState) -> T) -> Result<T, SurfaceError> {
        let mut shared = self.shared.borrow_mut();
        match shared.surfaces.get_mut(&self.id) {
            Some(state) if !state.torn_down => Ok(f(state)),
            _ => Err(SurfaceError::Operation(format!("surface {} is gone", self.id))),
        }
    }
}

impl Surface for HeadlessSurface {
    fn load_url(&mut self, url: &str) -> Result<(), SurfaceError> {
        self.with_state(|state| {
            state.loads.push(url.to_string());
            state.location = Some(url.to_string());
        })?;
        let mut shared = self.shared.borrow_mut();
        if shared.auto_complete {
            shared
                .events
                .push_back(NavigationEvent::new(self.id, NavigationKind::Committed, url));
            shared
                .events
                .push_back(NavigationEvent::new(self.id, NavigationKind::Finished, url));
        }
        Ok(())
    }

    fn set_bounds(&mut self, bounds: Rect) -> Result<(), SurfaceError> {
        self.with_state(|state| state.bounds = Some(bounds))
    }

    fn set_attached(&mut self, attached: bool) -> Result<(), SurfaceError> {
        self.with_state(|state| state.attached = attached)
    }

    fn current_url(&self) -> Option<String> {
        self.with_state(|state| state.location.clone()).ok().flatten()
    }

    fn inject_css(&mut self, css: &str) -> Result<(), SurfaceError> {
        self.with_state(|state| state.injected_css.push(css.to_string()))
    }

    fn reset_zoom(&mut self) -> Result<(), SurfaceError> {
        self.with_state(|state| state.zoom_resets += 1)
    }

    fn cookies(&self) -> Result<Vec<StoredCookie>, SurfaceError> {
        self.with_state(|_| ())?;
        Ok(self.shared.borrow().cookies.clone())
    }

    fn teardown(self) {
        let _ = self.with_state(|state| {
            state.attached = false;
            state.torn_down = true;
        });
    }
}
