//! Surface Registry for TaskaDeck.
//!
//! Owns every browsing surface, keyed by the resolved URL it is showing. Keys
//! follow navigation: when a surface lands somewhere else (redirects, in-page
//! routing) its entry moves to the new URL in one step, so a lookup never sees
//! both keys or neither.
//!
//! Lookup policy used by [`SurfaceRegistry::locate`]:
//! 1. exact key;
//! 2. a surface whose live location equals the target once query string and
//!    fragment are dropped from both (ties: exact location, then most recently
//!    shown), re-keyed to the target;
//! 3. a new surface.
//!
//! The registry is a bounded cache. Creating a surface at capacity evicts the
//! least recently shown one, never the protected (attached) surface.

use std::collections::HashMap;

use url::Url;

use crate::types::cookie::StoredCookie;
use crate::types::errors::SurfaceError;
use crate::types::layout::Rect;
use crate::types::surface::{NavigationEvent, NavigationKind, SurfaceId};

/// An embeddable, isolated web-rendering context.
pub trait Surface {
    fn load_url(&mut self, url: &str) -> Result<(), SurfaceError>;
    fn set_bounds(&mut self, bounds: Rect) -> Result<(), SurfaceError>;
    /// Attach (show) or detach (hide) the surface in the window.
    fn set_attached(&mut self, attached: bool) -> Result<(), SurfaceError>;
    /// Location as reported by the rendering engine itself.
    fn current_url(&self) -> Option<String>;
    fn inject_css(&mut self, css: &str) -> Result<(), SurfaceError>;
    fn reset_zoom(&mut self) -> Result<(), SurfaceError>;
    /// Every cookie visible through the shared session.
    fn cookies(&self) -> Result<Vec<StoredCookie>, SurfaceError>;
    /// Releases the surface and its rendering resources.
    fn teardown(self);
}

/// Creates surfaces bound to the shared session with navigation tracking wired.
pub trait SurfaceFactory {
    type Surface: Surface;
    fn create_surface(&mut self, id: SurfaceId, bounds: Rect) -> Result<Self::Surface, SurfaceError>;
}

/// A registry-owned surface plus the state the registry tracks for it.
pub struct ManagedSurface<S> {
    id: SurfaceId,
    key: String,
    location: String,
    loading: bool,
    last_shown: u64,
    handle: S,
}

impl<S: Surface> ManagedSurface<S> {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// URL this surface is registered under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last location reported by navigation tracking.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Location the engine is on right now. Runs ahead of [`location`](Self::location)
    /// while a navigation event is still queued.
    pub fn current_location(&self) -> String {
        self.handle.current_url().unwrap_or_else(|| self.location.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_shown(&self) -> u64 {
        self.last_shown
    }

    pub fn handle(&self) -> &S {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut S {
        &mut self.handle
    }
}

/// Which step of the lookup policy produced a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Exact,
    Redirected,
    Created,
}

/// A key move performed by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rekey {
    pub from: String,
    pub to: String,
}

/// What [`SurfaceRegistry::reconcile`] did with one navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub surface: SurfaceId,
    pub rekey: Option<Rekey>,
    /// Surface torn down because it held the key this surface moved to.
    pub displaced: Option<SurfaceId>,
}

impl Reconciliation {
    fn unchanged(surface: SurfaceId) -> Self {
        Self {
            surface,
            rekey: None,
            displaced: None,
        }
    }
}

pub struct SurfaceRegistry<F: SurfaceFactory> {
    factory: F,
    keys: HashMap<String, SurfaceId>,
    surfaces: HashMap<SurfaceId, ManagedSurface<F::Surface>>,
    bounds: Rect,
    capacity: usize,
    protected: Option<SurfaceId>,
    clock: u64,
}

impl<F: SurfaceFactory> SurfaceRegistry<F> {
    /// Creates an empty registry holding at most `capacity` surfaces (minimum 1).
    pub fn new(factory: F, capacity: usize) -> Self {
        Self {
            factory,
            keys: HashMap::new(),
            surfaces: HashMap::new(),
            bounds: Rect::default(),
            capacity: capacity.max(1),
            protected: None,
            clock: 0,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rectangle most recently applied to all surfaces.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    /// Exact key lookup with no side effects.
    pub fn lookup(&self, key: &str) -> Option<SurfaceId> {
        self.keys.get(key).copied()
    }

    pub fn get(&self, id: SurfaceId) -> Option<&ManagedSurface<F::Surface>> {
        self.surfaces.get(&id)
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut ManagedSurface<F::Surface>> {
        self.surfaces.get_mut(&id)
    }

    /// Snapshot of `(key, surface)` pairs.
    pub fn entries(&self) -> Vec<(String, SurfaceId)> {
        self.keys.iter().map(|(k, id)| (k.clone(), *id)).collect()
    }

    pub fn ids(&self) -> Vec<SurfaceId> {
        self.surfaces.keys().copied().collect()
    }

    /// Marks the surface that must survive eviction and key collisions.
    pub fn protect(&mut self, id: Option<SurfaceId>) {
        self.protected = id;
    }

    pub fn protected(&self) -> Option<SurfaceId> {
        self.protected
    }

    /// Records that `id` was just shown, for least-recently-shown eviction.
    pub fn touch(&mut self, id: SurfaceId) {
        self.clock += 1;
        if let Some(entry) = self.surfaces.get_mut(&id) {
            entry.last_shown = self.clock;
        }
    }

    /// Returns the surface registered under `resolved_url`, creating and
    /// loading one if absent.
    pub fn get_or_create(&mut self, resolved_url: &str) -> Result<SurfaceId, SurfaceError> {
        if let Some(id) = self.lookup(resolved_url) {
            return Ok(id);
        }

        let id = SurfaceId::new();
        let mut handle = self.factory.create_surface(id, self.bounds)?;
        self.make_room();
        if let Err(e) = handle.set_bounds(self.bounds) {
            log::warn!("Surface {}: initial bounds not applied: {}", id, e);
        }

        self.clock += 1;
        self.keys.insert(resolved_url.to_string(), id);
        let entry = self.surfaces.entry(id).or_insert(ManagedSurface {
            id,
            key: resolved_url.to_string(),
            location: resolved_url.to_string(),
            loading: true,
            last_shown: self.clock,
            handle,
        });

        if let Err(e) = entry.handle.load_url(resolved_url) {
            log::warn!("Surface {}: load of {} failed to start: {}", id, resolved_url, e);
            entry.loading = false;
        }

        log::info!("Created surface {} for {}", id, resolved_url);
        Ok(id)
    }

    /// Finds a surface for `resolved_url` by key, or by live location with the
    /// query string ignored. A location match is re-keyed to `resolved_url`.
    pub fn find_by_current_url(&mut self, resolved_url: &str) -> Option<SurfaceId> {
        if let Some(id) = self.lookup(resolved_url) {
            return Some(id);
        }

        let target = without_query(resolved_url);
        let id = self
            .surfaces
            .values()
            .map(|s| (s, s.current_location()))
            .filter(|(_, live)| live == resolved_url || without_query(live) == target)
            .max_by_key(|(s, live)| (live == resolved_url, s.last_shown))
            .map(|(s, _)| s.id)?;

        self.move_key(id, resolved_url.to_string());
        Some(id)
    }

    /// Applies the lookup policy: exact key, query-insensitive location, create.
    pub fn locate(&mut self, resolved_url: &str) -> Result<(SurfaceId, Located), SurfaceError> {
        if let Some(id) = self.lookup(resolved_url) {
            return Ok((id, Located::Exact));
        }
        if let Some(id) = self.find_by_current_url(resolved_url) {
            return Ok((id, Located::Redirected));
        }
        self.get_or_create(resolved_url)
            .map(|id| (id, Located::Created))
    }

    /// Folds one navigation event into the registry.
    ///
    /// Returns `None` for surfaces the registry no longer owns.
    pub fn reconcile(&mut self, event: &NavigationEvent) -> Option<Reconciliation> {
        let id = event.surface;
        let key_matches = {
            let Some(entry) = self.surfaces.get_mut(&id) else {
                log::debug!("Ignoring {:?} for unknown surface {}", event.kind, id);
                return None;
            };
            match &event.kind {
                NavigationKind::Committed => entry.loading = true,
                NavigationKind::Finished => entry.loading = false,
                NavigationKind::InPage => {}
                NavigationKind::Failed(reason) => {
                    entry.loading = false;
                    log::warn!("Surface {} failed to load {}: {}", id, event.url, reason);
                }
            }
            if !event.kind.settles_location() || event.url.is_empty() {
                return Some(Reconciliation::unchanged(id));
            }
            entry.location = event.url.clone();
            entry.key == event.url
        };
        if key_matches {
            return Some(Reconciliation::unchanged(id));
        }

        let mut displaced = None;
        if let Some(other) = self.lookup(&event.url).filter(|other| *other != id) {
            if self.protected == Some(other) {
                log::debug!(
                    "Surface {} reached {}, already shown by {}; keeping its key",
                    id,
                    event.url,
                    other
                );
                return Some(Reconciliation::unchanged(id));
            }
            self.evict(other);
            displaced = Some(other);
        }

        let rekey = self.move_key(id, event.url.clone());
        Some(Reconciliation {
            surface: id,
            rekey,
            displaced,
        })
    }

    /// Issues a fresh load on an existing surface.
    pub fn load(&mut self, id: SurfaceId, url: &str) -> bool {
        let Some(entry) = self.surfaces.get_mut(&id) else {
            return false;
        };
        match entry.handle.load_url(url) {
            Ok(()) => {
                entry.loading = true;
                true
            }
            Err(e) => {
                log::warn!("Surface {}: load of {} failed to start: {}", id, url, e);
                false
            }
        }
    }

    /// Stores `bounds` and applies it to every surface.
    pub fn apply_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        for entry in self.surfaces.values_mut() {
            if let Err(e) = entry.handle.set_bounds(bounds) {
                log::warn!("Surface {}: bounds not applied: {}", entry.id, e);
            }
        }
    }

    /// Removes and tears down one surface.
    pub fn evict(&mut self, id: SurfaceId) -> bool {
        let Some(entry) = self.surfaces.remove(&id) else {
            return false;
        };
        if self.keys.get(&entry.key) == Some(&id) {
            self.keys.remove(&entry.key);
        }
        if self.protected == Some(id) {
            self.protected = None;
        }
        log::info!("Tearing down surface {} ({})", id, entry.key);
        entry.handle.teardown();
        true
    }

    /// Tears down every surface.
    pub fn teardown_all(&mut self) {
        self.protected = None;
        for id in self.ids() {
            self.evict(id);
        }
    }

    /// Cookies seen through the shared session, read from the most recently
    /// shown surface that answers. `None` when no surface could be asked.
    pub fn cookies_snapshot(&self) -> Option<Vec<StoredCookie>> {
        let mut entries: Vec<&ManagedSurface<F::Surface>> = self.surfaces.values().collect();
        entries.sort_by_key(|s| std::cmp::Reverse(s.last_shown));
        entries.into_iter().find_map(|s| match s.handle.cookies() {
            Ok(cookies) => Some(cookies),
            Err(e) => {
                log::debug!("Surface {}: cookies unavailable: {}", s.id, e);
                None
            }
        })
    }

    fn make_room(&mut self) {
        while self.surfaces.len() >= self.capacity {
            let lru = self
                .surfaces
                .values()
                .filter(|s| Some(s.id) != self.protected)
                .min_by_key(|s| s.last_shown)
                .map(|s| s.id);
            match lru {
                Some(id) => {
                    self.evict(id);
                }
                None => break,
            }
        }
    }

    /// Moves `id` to `new_key`. The caller guarantees `new_key` is free or owned by `id`.
    fn move_key(&mut self, id: SurfaceId, new_key: String) -> Option<Rekey> {
        let entry = self.surfaces.get_mut(&id)?;
        if entry.key == new_key {
            return None;
        }
        let old = std::mem::replace(&mut entry.key, new_key.clone());
        if self.keys.get(&old) == Some(&id) {
            self.keys.remove(&old);
        }
        self.keys.insert(new_key.clone(), id);
        log::debug!("Re-keyed surface {}: {} -> {}", id, old, new_key);
        Some(Rekey {
            from: old,
            to: new_key,
        })
    }
}

/// `url` with query string and fragment removed.
pub fn without_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or(url)
            .to_string(),
    }
}
