// TaskaDeck shared type definitions
// Each submodule defines types used across the application.

pub mod cookie;
pub mod errors;
pub mod layout;
pub mod settings;
pub mod surface;
