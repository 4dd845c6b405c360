//! Layout Controller for TaskaDeck.
//!
//! Computes the content rectangle to the right of the sidebar and pushes it to
//! every managed surface, attached or not.

use crate::managers::surface_registry::{SurfaceFactory, SurfaceRegistry};
use crate::types::layout::{Rect, WindowSize};

/// Sidebar width when collapsed to icons.
pub const SIDEBAR_COLLAPSED_WIDTH: u32 = 78;
/// Sidebar width when expanded with labels.
pub const SIDEBAR_EXPANDED_WIDTH: u32 = 250;

/// Returns the sidebar width for the given state.
pub fn sidebar_width(sidebar_open: bool) -> u32 {
    if sidebar_open {
        SIDEBAR_EXPANDED_WIDTH
    } else {
        SIDEBAR_COLLAPSED_WIDTH
    }
}

/// Content rectangle for a window size and sidebar state.
pub fn compute_bounds(window: WindowSize, sidebar_open: bool) -> Rect {
    let sidebar = sidebar_width(sidebar_open);
    Rect {
        x: sidebar,
        y: 0,
        width: window.width.saturating_sub(sidebar),
        height: window.height,
    }
}

/// Tracks the inputs of [`compute_bounds`] between events.
#[derive(Debug, Clone)]
pub struct LayoutController {
    window: WindowSize,
    sidebar_open: bool,
}

impl LayoutController {
    /// Starts with the sidebar collapsed.
    pub fn new(window: WindowSize) -> Self {
        Self {
            window,
            sidebar_open: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        compute_bounds(self.window, self.sidebar_open)
    }

    pub fn window_size(&self) -> WindowSize {
        self.window
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn set_window_size(&mut self, window: WindowSize) {
        self.window = window;
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
    }

    /// Pushes the current rectangle to every surface in `registry`.
    pub fn apply_to_all<F: SurfaceFactory>(&self, registry: &mut SurfaceRegistry<F>) {
        registry.apply_bounds(self.bounds());
    }
}
