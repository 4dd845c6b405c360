//! Unit tests for the SurfaceRegistry: keying, lookup policy, navigation
//! reconciliation and bounded eviction.

use taskadeck::headless::{HeadlessFactory, HeadlessProbe};
use taskadeck::managers::surface_registry::{Located, Rekey, SurfaceRegistry};
use taskadeck::types::cookie::StoredCookie;
use taskadeck::types::errors::SurfaceError;
use taskadeck::types::layout::Rect;
use taskadeck::types::surface::{NavigationEvent, NavigationKind, SurfaceId};

fn registry(capacity: usize) -> (SurfaceRegistry<HeadlessFactory>, HeadlessProbe) {
    let factory = HeadlessFactory::new();
    let probe = factory.probe();
    (SurfaceRegistry::new(factory, capacity), probe)
}

fn event(id: SurfaceId, kind: NavigationKind, url: &str) -> NavigationEvent {
    NavigationEvent::new(id, kind, url)
}

/// Moves the engine surface and delivers the resulting event.
fn navigate(
    reg: &mut SurfaceRegistry<HeadlessFactory>,
    probe: &HeadlessProbe,
    id: SurfaceId,
    kind: NavigationKind,
    url: &str,
) {
    probe.navigate(id, kind, url);
    for e in probe.drain_events() {
        reg.reconcile(&e);
    }
}

// === Creation ===

#[test]
fn test_get_or_create_loads_new_surface() {
    let (mut reg, probe) = registry(8);
    let id = reg.get_or_create("https://site/active").unwrap();

    let state = probe.state(id).unwrap();
    assert_eq!(state.loads, vec!["https://site/active".to_string()]);
    assert!(!state.attached);
    let entry = reg.get(id).unwrap();
    assert!(entry.is_loading());
    assert_eq!(entry.key(), "https://site/active");
    assert_eq!(entry.location(), "https://site/active");
}

#[test]
fn test_get_or_create_is_idempotent_per_key() {
    let (mut reg, probe) = registry(8);
    let first = reg.get_or_create("https://site/active").unwrap();
    let second = reg.get_or_create("https://site/active").unwrap();

    assert_eq!(first, second);
    assert_eq!(reg.len(), 1);
    assert_eq!(probe.created().len(), 1);
    assert_eq!(probe.state(first).unwrap().loads.len(), 1);
}

#[test]
fn test_new_surface_gets_current_bounds() {
    let (mut reg, probe) = registry(8);
    reg.apply_bounds(Rect::new(78, 0, 1522, 900));
    let id = reg.get_or_create("https://site/").unwrap();
    assert_eq!(probe.state(id).unwrap().bounds, Some(Rect::new(78, 0, 1522, 900)));
}

#[test]
fn test_creation_failure_leaves_registry_unchanged() {
    let (mut reg, probe) = registry(8);
    probe.fail_creation(true);

    let err = reg.get_or_create("https://site/").unwrap_err();
    assert!(matches!(err, SurfaceError::Creation(_)));
    assert!(reg.is_empty());
    assert_eq!(reg.lookup("https://site/"), None);
}

#[test]
fn test_creation_failure_on_full_cache_keeps_cached_surfaces() {
    let (mut reg, probe) = registry(2);
    let first = reg.get_or_create("https://site/1").unwrap();
    let second = reg.get_or_create("https://site/2").unwrap();
    probe.fail_creation(true);

    assert!(reg.get_or_create("https://site/3").is_err());
    assert_eq!(reg.len(), 2);
    assert_eq!(probe.live(), vec![first, second]);
    assert_eq!(reg.lookup("https://site/1"), Some(first));
    assert_eq!(reg.lookup("https://site/2"), Some(second));
}

#[test]
fn test_lookup_sees_location_before_its_event_arrives() {
    let (mut reg, probe) = registry(8);
    let id = reg.get_or_create("https://site/a").unwrap();

    // The engine has moved; its event is still queued.
    probe.navigate(id, NavigationKind::Committed, "https://site/b");
    assert_eq!(reg.get(id).unwrap().location(), "https://site/a");
    assert_eq!(reg.get(id).unwrap().current_location(), "https://site/b");

    assert_eq!(reg.locate("https://site/b").unwrap(), (id, Located::Redirected));
    assert_eq!(reg.lookup("https://site/a"), None);
    assert_eq!(probe.created().len(), 1);

    for e in probe.drain_events() {
        reg.reconcile(&e);
    }
    assert_eq!(reg.lookup("https://site/b"), Some(id));
    assert_eq!(reg.entries().len(), 1);
}

// === Lookup policy ===

#[test]
fn test_locate_prefers_exact_key() {
    let (mut reg, _) = registry(8);
    let id = reg.get_or_create("https://site/active").unwrap();
    assert_eq!(reg.locate("https://site/active").unwrap(), (id, Located::Exact));
}

#[test]
fn test_locate_reuses_surface_after_query_redirect() {
    let (mut reg, probe) = registry(8);
    let id = reg.get_or_create("https://site/active").unwrap();

    navigate(&mut reg, &probe, id, NavigationKind::Finished, "https://site/active?authed=1");
    assert_eq!(reg.lookup("https://site/active"), None);

    let (found, how) = reg.locate("https://site/active").unwrap();
    assert_eq!(found, id);
    assert_eq!(how, Located::Redirected);
    assert_eq!(reg.len(), 1);
    assert_eq!(probe.created().len(), 1);
    assert_eq!(reg.lookup("https://site/active"), Some(id));
    assert_eq!(reg.lookup("https://site/active?authed=1"), None);
}

#[test]
fn test_locate_does_not_confuse_shared_path_prefixes() {
    let (mut reg, probe) = registry(8);
    let projects = reg.get_or_create("https://site/projects").unwrap();
    let archive = reg.get_or_create("https://site/projects-archive").unwrap();
    navigate(&mut reg, &probe, projects, NavigationKind::Committed, "https://site/projects?page=2");
    reg.touch(archive);

    assert_eq!(reg.locate("https://site/projects").unwrap(), (projects, Located::Redirected));
    assert_eq!(reg.lookup("https://site/projects-archive"), Some(archive));
}

#[test]
fn test_locate_creates_when_only_a_longer_path_exists() {
    let (mut reg, _) = registry(8);
    let archive = reg.get_or_create("https://site/projects/archive").unwrap();

    let (id, how) = reg.locate("https://site/projects").unwrap();
    assert_eq!(how, Located::Created);
    assert_ne!(id, archive);
}

#[test]
fn test_ambiguous_match_picks_most_recently_shown() {
    let (mut reg, _) = registry(8);
    let older = reg.get_or_create("https://site/p?a=1").unwrap();
    let newer = reg.get_or_create("https://site/p?b=2").unwrap();
    reg.touch(older);

    assert_eq!(reg.find_by_current_url("https://site/p"), Some(older));

    reg.touch(newer);
    assert_eq!(reg.find_by_current_url("https://site/p"), Some(older), "exact key now wins");
}

#[test]
fn test_ambiguous_match_prefers_exact_location() {
    let (mut reg, probe) = registry(8);
    let holder = reg.get_or_create("https://s/p").unwrap();
    reg.protect(Some(holder));
    let other = reg.get_or_create("https://s/q").unwrap();

    // `other` lands on the protected surface's key and stays under its own.
    navigate(&mut reg, &probe, other, NavigationKind::Finished, "https://s/p");
    assert_eq!(reg.lookup("https://s/q"), Some(other));

    navigate(&mut reg, &probe, holder, NavigationKind::Finished, "https://s/p?a=1");
    reg.touch(holder);

    assert_eq!(reg.find_by_current_url("https://s/p"), Some(other));
    assert_eq!(reg.lookup("https://s/p"), Some(other));
    assert_eq!(reg.lookup("https://s/q"), None);
}

// === Reconciliation ===

#[test]
fn test_navigation_moves_key_atomically() {
    let (mut reg, _) = registry(8);
    let id = reg.get_or_create("https://a.example/").unwrap();

    let outcome = reg
        .reconcile(&event(id, NavigationKind::Committed, "https://b.example/"))
        .unwrap();

    assert_eq!(
        outcome.rekey,
        Some(Rekey {
            from: "https://a.example/".to_string(),
            to: "https://b.example/".to_string(),
        })
    );
    assert_eq!(reg.lookup("https://b.example/"), Some(id));
    assert_eq!(reg.lookup("https://a.example/"), None);
    assert_eq!(reg.entries().len(), 1);
}

#[test]
fn test_in_page_navigation_rekeys_without_touching_loading() {
    let (mut reg, _) = registry(8);
    let id = reg.get_or_create("https://app/").unwrap();
    reg.reconcile(&event(id, NavigationKind::Finished, "https://app/"));

    reg.reconcile(&event(id, NavigationKind::InPage, "https://app/#/board"));

    let entry = reg.get(id).unwrap();
    assert_eq!(entry.key(), "https://app/#/board");
    assert!(!entry.is_loading());
}

#[test]
fn test_same_location_event_is_a_no_op() {
    let (mut reg, _) = registry(8);
    let id = reg.get_or_create("https://app/").unwrap();
    let outcome = reg.reconcile(&event(id, NavigationKind::Finished, "https://app/")).unwrap();
    assert_eq!(outcome.rekey, None);
    assert_eq!(outcome.displaced, None);
    assert!(!reg.get(id).unwrap().is_loading());
}

#[test]
fn test_failed_load_changes_nothing_but_loading() {
    let (mut reg, _) = registry(8);
    let id = reg.get_or_create("https://down.example/").unwrap();

    let outcome = reg
        .reconcile(&event(id, NavigationKind::Failed("ERR_CONNECTION_REFUSED".into()), "https://down.example/"))
        .unwrap();

    assert_eq!(outcome.rekey, None);
    let entry = reg.get(id).unwrap();
    assert!(!entry.is_loading());
    assert_eq!(entry.key(), "https://down.example/");
}

#[test]
fn test_events_for_unknown_surfaces_are_ignored() {
    let (mut reg, _) = registry(8);
    reg.get_or_create("https://app/").unwrap();
    assert!(reg
        .reconcile(&event(SurfaceId::new(), NavigationKind::Finished, "https://elsewhere/"))
        .is_none());
    assert_eq!(reg.lookup("https://elsewhere/"), None);
}

#[test]
fn test_collision_displaces_unprotected_surface() {
    let (mut reg, probe) = registry(8);
    let a = reg.get_or_create("https://a/").unwrap();
    let b = reg.get_or_create("https://b/").unwrap();

    let outcome = reg.reconcile(&event(b, NavigationKind::Committed, "https://a/")).unwrap();

    assert_eq!(outcome.displaced, Some(a));
    assert!(probe.state(a).unwrap().torn_down);
    assert!(!reg.contains(a));
    assert_eq!(reg.lookup("https://a/"), Some(b));
    assert_eq!(reg.len(), 1);
}

#[test]
fn test_collision_with_protected_surface_keeps_both() {
    let (mut reg, probe) = registry(8);
    let a = reg.get_or_create("https://a/").unwrap();
    reg.protect(Some(a));
    let b = reg.get_or_create("https://b/").unwrap();

    let outcome = reg.reconcile(&event(b, NavigationKind::Committed, "https://a/")).unwrap();

    assert_eq!(outcome.displaced, None);
    assert_eq!(outcome.rekey, None);
    assert!(!probe.state(a).unwrap().torn_down);
    assert_eq!(reg.lookup("https://a/"), Some(a));
    assert_eq!(reg.lookup("https://b/"), Some(b));
    assert_eq!(reg.get(b).unwrap().location(), "https://a/");
}

// === Eviction ===

#[test]
fn test_capacity_evicts_least_recently_shown() {
    let (mut reg, probe) = registry(2);
    let a = reg.get_or_create("https://a/").unwrap();
    let b = reg.get_or_create("https://b/").unwrap();
    reg.touch(a);

    let c = reg.get_or_create("https://c/").unwrap();

    assert_eq!(reg.len(), 2);
    assert!(reg.contains(a) && reg.contains(c));
    assert!(!reg.contains(b));
    assert!(probe.state(b).unwrap().torn_down);
    assert_eq!(reg.lookup("https://b/"), None);
}

#[test]
fn test_protected_surface_is_never_evicted() {
    let (mut reg, probe) = registry(1);
    let a = reg.get_or_create("https://a/").unwrap();
    reg.protect(Some(a));

    let b = reg.get_or_create("https://b/").unwrap();

    assert!(reg.contains(a));
    assert!(reg.contains(b));
    assert!(!probe.state(a).unwrap().torn_down);
}

#[test]
fn test_capacity_has_a_floor_of_one() {
    let (reg, _) = registry(0);
    assert_eq!(reg.capacity(), 1);
}

#[test]
fn test_teardown_all_releases_every_surface() {
    let (mut reg, probe) = registry(8);
    reg.get_or_create("https://a/").unwrap();
    reg.get_or_create("https://b/").unwrap();

    reg.teardown_all();

    assert!(reg.is_empty());
    assert!(reg.entries().is_empty());
    assert!(probe.live().is_empty());
}

// === Cookies ===

#[test]
fn test_cookie_snapshot_needs_a_surface() {
    let (mut reg, probe) = registry(8);
    let cookie = StoredCookie {
        name: "sid".into(),
        domain: "site".into(),
        path: "/".into(),
        raw: "sid=1".into(),
    };
    probe.set_cookies(vec![cookie.clone()]);
    assert_eq!(reg.cookies_snapshot(), None);

    reg.get_or_create("https://site/").unwrap();
    assert_eq!(reg.cookies_snapshot(), Some(vec![cookie]));
}
