// TaskaDeck services
// Leaf services: URL resolution, the shared cookie session, and settings.

pub mod session_store;
pub mod settings_engine;
pub mod url_resolver;
