//! Server-side session table
//!
//! Sessions are keyed by the random id carried in the session cookie and
//! hold the signed-in username plus one-shot notices for the next page.

use crate::core::ctx::Ctx;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "cms_session";

#[derive(Debug, Clone)]
pub struct SessionData {
    pub username: Option<String>,
    pub notices: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionData>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Hand out a fresh anonymous context; nothing is stored until the
    /// session signs in or receives a notice
    pub fn start(&self) -> Ctx {
        Ctx::new(Uuid::new_v4().to_string(), None)
    }

    /// Context for a request carrying `presented` as its cookie value.
    /// Returns `true` alongside when the caller needs a new cookie.
    pub fn attach(&self, presented: Option<&str>) -> (Ctx, bool) {
        match presented {
            Some(id) if Uuid::parse_str(id).is_ok() => {
                let ctx = self
                    .resume(id)
                    .unwrap_or_else(|| Ctx::new(id.to_string(), None));
                (ctx, false)
            }
            _ => (self.start(), true),
        }
    }

    /// Look up a live session and push its expiry forward
    pub fn resume(&self, id: &str) -> Option<Ctx> {
        let now = Utc::now();
        let mut sessions = self.sessions.write();

        let session = sessions.get_mut(id)?;
        if session.expires_at <= now {
            sessions.remove(id);
            debug!("[Session] Expired {}", id);
            return None;
        }

        session.expires_at = now + self.ttl;
        Some(Ctx::new(id.to_string(), session.username.clone()))
    }

    /// Run `f` on the stored entry for `id`, creating it if needed
    fn with_entry<R>(&self, id: &str, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let now = Utc::now();
        let mut sessions = self.sessions.write();

        if !sessions.contains_key(id) {
            sessions.retain(|_, s| s.expires_at > now);
            debug!("[Session] Storing {} ({} live)", id, sessions.len() + 1);
        }
        let session = sessions.entry(id.to_string()).or_insert_with(|| SessionData {
            username: None,
            notices: Vec::new(),
            expires_at: now,
        });
        session.expires_at = now + self.ttl;
        f(session)
    }

    pub fn sign_in(&self, id: &str, username: &str) {
        self.with_entry(id, |s| s.username = Some(username.to_string()));
        info!("[Session] {} signed in", username);
    }

    /// Clear the signed-in user, returning who it was
    pub fn sign_out(&self, id: &str) -> Option<String> {
        let username = self
            .sessions
            .write()
            .get_mut(id)
            .and_then(|s| s.username.take());
        if let Some(name) = &username {
            info!("[Session] {} signed out", name);
        }
        username
    }

    pub fn push_notice(&self, id: &str, notice: impl Into<String>) {
        let notice = notice.into();
        self.with_entry(id, |s| s.notices.push(notice));
    }

    /// Drain pending notices; each is handed out once
    pub fn take_notices(&self, id: &str) -> Vec<String> {
        self.sessions
            .write()
            .get_mut(id)
            .map(|s| std::mem::take(&mut s.notices))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let store = SessionStore::new(Duration::hours(1));
        let ctx = store.start();
        assert!(!ctx.is_signed_in());

        store.sign_in(ctx.session_id(), "admin");
        let resumed = store.resume(ctx.session_id()).unwrap();
        assert_eq!(resumed.username(), Some("admin"));

        assert_eq!(store.sign_out(ctx.session_id()).as_deref(), Some("admin"));
        assert!(!store.resume(ctx.session_id()).unwrap().is_signed_in());
        assert_eq!(store.sign_out(ctx.session_id()), None);
    }

    #[test]
    fn test_notices_are_one_shot_and_per_session() {
        let store = SessionStore::new(Duration::hours(1));
        let a = store.start();
        let b = store.start();

        store.push_notice(a.session_id(), "first");
        store.push_notice(a.session_id(), "second");

        assert!(store.take_notices(b.session_id()).is_empty());
        assert_eq!(store.take_notices(a.session_id()), vec!["first", "second"]);
        assert!(store.take_notices(a.session_id()).is_empty());
    }

    #[test]
    fn test_unknown_and_expired_sessions() {
        let store = SessionStore::new(Duration::zero());
        assert!(store.resume("not-a-session").is_none());

        let ctx = store.start();
        store.push_notice(ctx.session_id(), "gone soon");
        assert_eq!(store.len(), 1);
        assert!(store.resume(ctx.session_id()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_anonymous_callers_are_not_stored() {
        let store = SessionStore::new(Duration::hours(1));

        for _ in 0..100 {
            let (ctx, is_new) = store.attach(None);
            assert!(is_new);
            assert!(!ctx.is_signed_in());
            assert!(store.take_notices(ctx.session_id()).is_empty());
        }
        assert!(store.is_empty());

        let (first, _) = store.attach(None);
        let (again, is_new) = store.attach(Some(first.session_id()));
        assert!(!is_new);
        assert_eq!(again.session_id(), first.session_id());
        assert!(store.is_empty());

        let (_, is_new) = store.attach(Some("../not-a-uuid"));
        assert!(is_new);
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_entries_are_pruned_when_storing() {
        let store = SessionStore::new(Duration::zero());
        for _ in 0..10 {
            store.push_notice(store.start().session_id(), "stale");
        }
        assert_eq!(store.len(), 1);
    }
}
