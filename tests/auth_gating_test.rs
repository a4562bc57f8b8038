// Protected views (screener, watchlist) must bounce anonymous visitors
// to the login view, and the session must survive a restart the way the
// original client's localStorage token did.

use tempfile::TempDir;

use screener_cli::session::SessionStore;
use screener_cli::ui::app::{resolve_route, View};

#[test]
fn anonymous_visitor_is_redirected_to_login() {
    let dir = TempDir::new().unwrap();
    let session = SessionStore::load_from(dir.path().join("session.json")).unwrap();
    assert!(!session.is_authenticated());

    assert_eq!(
        resolve_route(View::Screen, session.is_authenticated()),
        View::Login
    );
    assert_eq!(
        resolve_route(View::Watchlist, session.is_authenticated()),
        View::Login
    );
    // Public routes stay reachable
    assert_eq!(
        resolve_route(View::Home, session.is_authenticated()),
        View::Home
    );
    assert_eq!(
        resolve_route(View::Detail, session.is_authenticated()),
        View::Detail
    );
}

#[test]
fn login_then_restart_keeps_the_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    {
        let mut session = SessionStore::load_from(path.clone()).unwrap();
        session.store("alice", "bearer-token-abc").unwrap();
    }

    // "Restart": a new store reading the same file
    let session = SessionStore::load_from(path).unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("bearer-token-abc"));
    assert_eq!(
        resolve_route(View::Screen, session.is_authenticated()),
        View::Screen
    );
}

#[test]
fn logout_locks_protected_views_again() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    let mut session = SessionStore::load_from(path).unwrap();
    session.store("bob", "tok").unwrap();
    session.clear().unwrap();

    assert_eq!(
        resolve_route(View::Watchlist, session.is_authenticated()),
        View::Login
    );
}
