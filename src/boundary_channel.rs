//! Boundary channel between the sidebar UI and the shell.
//!
//! The sidebar posts JSON messages through `window.ipc.postMessage`. Only two
//! message types exist, and only the sidebar webview carries the IPC handler:
//! content surfaces never see this channel.
//!
//! ```json
//! {"type": "navigate-request", "url": "taska://kanban"}
//! {"type": "sidebar-state", "open": true}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::managers::presentation_controller::PresentationController;
use crate::managers::surface_registry::SurfaceFactory;
use crate::types::errors::{BoundaryError, PresentationError};

pub const NAVIGATE_REQUEST: &str = "navigate-request";
pub const SIDEBAR_STATE: &str = "sidebar-state";

/// Script installed in the sidebar webview. It exposes exactly two functions.
pub const BRIDGE_JS: &str = r#"(function () {
  if (window.taskadeck) { return; }
  const post = (message) => window.ipc.postMessage(JSON.stringify(message));
  Object.defineProperty(window, 'taskadeck', {
    value: Object.freeze({
      navigate(url) { post({ type: 'navigate-request', url: url == null ? '' : String(url) }); },
      setSidebarOpen(open) { post({ type: 'sidebar-state', open: !!open }); },
    }),
    writable: false,
    configurable: false,
  });
})();"#;

/// A message received over the boundary channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoundaryMessage {
    NavigateRequest {
        #[serde(default)]
        url: Option<String>,
    },
    SidebarState {
        open: bool,
    },
}

impl BoundaryMessage {
    pub fn navigate(url: impl Into<String>) -> Self {
        BoundaryMessage::NavigateRequest {
            url: Some(url.into()),
        }
    }

    pub fn sidebar(open: bool) -> Self {
        BoundaryMessage::SidebarState { open }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parses one message body.
pub fn parse_message(body: &str) -> Result<BoundaryMessage, BoundaryError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| BoundaryError::Malformed(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| BoundaryError::Malformed("missing message type".to_string()))?;

    match kind {
        NAVIGATE_REQUEST => Ok(BoundaryMessage::NavigateRequest {
            url: value.get("url").and_then(Value::as_str).map(str::to_string),
        }),
        SIDEBAR_STATE => {
            let open = value
                .get("open")
                .and_then(Value::as_bool)
                .ok_or_else(|| BoundaryError::Malformed("sidebar-state needs a boolean 'open'".to_string()))?;
            Ok(BoundaryMessage::SidebarState { open })
        }
        other => Err(BoundaryError::UnknownMessage(other.to_string())),
    }
}

/// Routes a message to the presentation controller. Fire-and-forget: failures
/// are logged and nothing is returned to the sender.
pub fn dispatch<F: SurfaceFactory>(controller: &mut PresentationController<F>, message: BoundaryMessage) {
    match message {
        BoundaryMessage::NavigateRequest { url } => {
            match controller.show(url.as_deref().unwrap_or_default()) {
                Ok(_) => {}
                Err(PresentationError::EmptyUrl) => log::warn!("Dropped navigation request without a URL"),
                Err(e) => log::error!("Navigation request failed: {}", e),
            }
        }
        BoundaryMessage::SidebarState { open } => controller.set_sidebar_open(open),
    }
}

/// Parses and dispatches one raw IPC body.
pub fn handle_ipc<F: SurfaceFactory>(
    controller: &mut PresentationController<F>,
    body: &str,
) -> Result<(), BoundaryError> {
    let message = parse_message(body)?;
    log::debug!("Boundary message: {:?}", message);
    dispatch(controller, message);
    Ok(())
}
