// TaskaDeck state managers
// Managers own the surfaces and decide where and which one is shown.

pub mod layout_controller;
pub mod presentation_controller;
pub mod surface_registry;
