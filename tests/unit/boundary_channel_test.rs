//! Unit tests for the boundary channel: message decoding and dispatch.

use rstest::rstest;
use taskadeck::boundary_channel::{dispatch, handle_ipc, parse_message, BoundaryMessage, BRIDGE_JS};
use taskadeck::headless::{HeadlessFactory, HeadlessProbe};
use taskadeck::managers::layout_controller::LayoutController;
use taskadeck::managers::presentation_controller::{Presentation, PresentationController};
use taskadeck::managers::surface_registry::SurfaceRegistry;
use taskadeck::services::url_resolver::UrlResolver;
use taskadeck::types::errors::BoundaryError;
use taskadeck::types::layout::{Rect, WindowSize};

fn controller() -> (PresentationController<HeadlessFactory>, HeadlessProbe) {
    let factory = HeadlessFactory::new();
    let probe = factory.probe();
    let registry = SurfaceRegistry::new(factory, 8);
    let layout = LayoutController::new(WindowSize::new(1600, 900));
    (
        PresentationController::new(registry, layout, UrlResolver::new(vec![])),
        probe,
    )
}

// === Decoding ===

#[test]
fn test_parse_navigate_request() {
    let msg = parse_message(r#"{"type":"navigate-request","url":"taska://kanban"}"#).unwrap();
    assert_eq!(msg, BoundaryMessage::navigate("taska://kanban"));
}

#[test]
fn test_parse_navigate_request_without_url() {
    let msg = parse_message(r#"{"type":"navigate-request"}"#).unwrap();
    assert_eq!(msg, BoundaryMessage::NavigateRequest { url: None });
}

#[rstest]
#[case(r#"{"type":"sidebar-state","open":true}"#, true)]
#[case(r#"{"type":"sidebar-state","open":false}"#, false)]
fn test_parse_sidebar_state(#[case] body: &str, #[case] open: bool) {
    assert_eq!(parse_message(body).unwrap(), BoundaryMessage::sidebar(open));
}

#[rstest]
#[case("not json")]
#[case(r#"{"url":"https://x/"}"#)]
#[case(r#"{"type":42}"#)]
#[case(r#"{"type":"sidebar-state"}"#)]
#[case(r#"{"type":"sidebar-state","open":"yes"}"#)]
fn test_malformed_messages(#[case] body: &str) {
    assert!(matches!(parse_message(body), Err(BoundaryError::Malformed(_))));
}

#[rstest]
#[case("load-url")]
#[case("open-devtools")]
#[case("fs-read")]
fn test_unknown_message_types_are_rejected(#[case] kind: &str) {
    let body = format!(r#"{{"type":"{}","url":"https://x/"}}"#, kind);
    assert_eq!(
        parse_message(&body),
        Err(BoundaryError::UnknownMessage(kind.to_string()))
    );
}

#[test]
fn test_to_json_matches_wire_format() {
    let json: serde_json::Value = serde_json::from_str(&BoundaryMessage::sidebar(true).to_json()).unwrap();
    assert_eq!(json, serde_json::json!({"type": "sidebar-state", "open": true}));

    let json: serde_json::Value =
        serde_json::from_str(&BoundaryMessage::navigate("https://x/").to_json()).unwrap();
    assert_eq!(json, serde_json::json!({"type": "navigate-request", "url": "https://x/"}));
}

#[test]
fn test_bridge_exposes_only_two_capabilities() {
    assert!(BRIDGE_JS.contains("navigate(url)"));
    assert!(BRIDGE_JS.contains("setSidebarOpen(open)"));
    assert!(BRIDGE_JS.contains("'navigate-request'"));
    assert!(BRIDGE_JS.contains("'sidebar-state'"));
    assert!(BRIDGE_JS.contains("Object.freeze"));
}

// === Dispatch ===

#[test]
fn test_navigate_request_shows_url() {
    let (mut controller, probe) = controller();
    dispatch(&mut controller, BoundaryMessage::navigate("https://site/active"));

    let id = controller.attached().expect("a surface should be attached");
    assert_eq!(probe.attached(), vec![id]);
    assert_eq!(controller.registry().lookup("https://site/active"), Some(id));
}

#[rstest]
#[case(r#"{"type":"navigate-request","url":""}"#)]
#[case(r#"{"type":"navigate-request","url":"   "}"#)]
#[case(r#"{"type":"navigate-request"}"#)]
fn test_empty_navigate_request_does_nothing(#[case] body: &str) {
    let (mut controller, probe) = controller();
    handle_ipc(&mut controller, body).unwrap();

    assert!(probe.created().is_empty());
    assert_eq!(controller.state(), Presentation::Idle);
}

#[test]
fn test_empty_navigate_request_keeps_current_surface() {
    let (mut controller, probe) = controller();
    handle_ipc(&mut controller, r#"{"type":"navigate-request","url":"https://a/"}"#).unwrap();
    let id = controller.attached().unwrap();

    handle_ipc(&mut controller, r#"{"type":"navigate-request","url":""}"#).unwrap();

    assert_eq!(controller.attached(), Some(id));
    assert_eq!(probe.attached(), vec![id]);
    assert_eq!(probe.created().len(), 1);
}

#[test]
fn test_sidebar_state_relayouts_surfaces() {
    let (mut controller, probe) = controller();
    handle_ipc(&mut controller, r#"{"type":"navigate-request","url":"https://a/"}"#).unwrap();
    let id = controller.attached().unwrap();

    handle_ipc(&mut controller, r#"{"type":"sidebar-state","open":true}"#).unwrap();
    assert!(controller.layout().sidebar_open());
    assert_eq!(probe.state(id).unwrap().bounds, Some(Rect::new(250, 0, 1350, 900)));

    handle_ipc(&mut controller, r#"{"type":"sidebar-state","open":false}"#).unwrap();
    assert_eq!(probe.state(id).unwrap().bounds, Some(Rect::new(78, 0, 1522, 900)));
}

#[test]
fn test_rejected_message_changes_nothing() {
    let (mut controller, probe) = controller();
    let err = handle_ipc(&mut controller, r#"{"type":"load-url","url":"https://a/"}"#).unwrap_err();

    assert!(matches!(err, BoundaryError::UnknownMessage(_)));
    assert!(probe.created().is_empty());
    assert!(!controller.layout().sidebar_open());
}
