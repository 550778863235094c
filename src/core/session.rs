//! Session context - Auth, profile, notifications and UI flags for one signed-in admin.
//!
//! The context is a plain value handed to whoever needs it. Persistence happens only at the
//! edges: [`SessionContext::to_json`] / [`SessionContext::restore`] define the stored shape, and
//! a [`SessionStore`] decides where the JSON lives (a file, or memory in tests).
//!
//! Only auth, profile and UI flags are persisted. Notifications belong to the running session
//! and start empty after a restore. An auth session that has expired by the time it is restored
//! is dropped together with the profile.

use crate::{
    entities::KycStatus,
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Version of the persisted JSON shape
pub const SESSION_VERSION: u32 = 1;

/// What the signed-in account may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Investor,
    Admin,
}

/// Credentials issued by the backend at sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    /// Bearer token sent with API requests
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Whether the token is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Profile data shown in the header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub kyc_status: KycStatus,
}

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// In-session message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Persisted presentation preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiFlags {
    pub sidebar_collapsed: bool,
    pub dark_mode: bool,
    /// Ids of announcement banners the user closed
    pub dismissed_banners: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct PersistedSession {
    version: u32,
    auth: Option<AuthSession>,
    profile: Option<Profile>,
    #[serde(default)]
    ui: UiFlags,
}

/// Everything the dashboard knows about the current user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    auth: Option<AuthSession>,
    profile: Option<Profile>,
    notifications: Vec<Notification>,
    next_notification_id: u64,
    ui: UiFlags,
}

impl SessionContext {
    /// A signed-out context with default UI flags.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, auth: AuthSession, profile: Profile) {
        info!(user_id = auth.user_id, role = ?auth.role, "Signed in");
        self.auth = Some(auth);
        self.profile = Some(profile);
    }

    /// Drops credentials, profile and notifications. UI flags survive.
    pub fn sign_out(&mut self) {
        if let Some(auth) = self.auth.take() {
            info!(user_id = auth.user_id, "Signed out");
        }
        self.profile = None;
        self.notifications.clear();
    }

    pub const fn auth(&self) -> Option<&AuthSession> {
        self.auth.as_ref()
    }

    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    /// Signed in with a token that has not expired at `now`.
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.auth.as_ref().is_some_and(|auth| auth.is_valid_at(now))
    }

    pub fn is_admin(&self, now: DateTime<Utc>) -> bool {
        self.is_authenticated(now) && self.auth.as_ref().is_some_and(|a| a.role == Role::Admin)
    }

    pub const fn ui(&self) -> &UiFlags {
        &self.ui
    }

    pub const fn ui_mut(&mut self) -> &mut UiFlags {
        &mut self.ui
    }

    /// Adds an unread notification and returns its id.
    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        self.next_notification_id += 1;
        let id = self.next_notification_id;
        self.notifications.push(Notification {
            id,
            level,
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        });
        id
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Marks one notification read; `false` if there is no such notification.
    pub fn mark_read(&mut self, id: u64) -> bool {
        self.notifications
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| n.read = true)
            .is_some()
    }

    pub fn mark_all_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
        }
    }

    /// Removes a notification; `false` if there is no such notification.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    /// Serializes the persisted part of the context.
    pub fn to_json(&self) -> Result<String> {
        let persisted = PersistedSession {
            version: SESSION_VERSION,
            auth: self.auth.clone(),
            profile: self.profile.clone(),
            ui: self.ui.clone(),
        };
        serde_json::to_string(&persisted).map_err(Into::into)
    }

    /// Rebuilds a context from [`SessionContext::to_json`] output.
    ///
    /// Auth that expired before `now` is dropped along with the profile.
    pub fn restore(raw: &str, now: DateTime<Utc>) -> Result<Self> {
        let persisted: PersistedSession = serde_json::from_str(raw)?;
        if persisted.version != SESSION_VERSION {
            return Err(Error::Session {
                message: format!("Unsupported session version {}", persisted.version),
            });
        }

        let mut context = Self {
            auth: persisted.auth,
            profile: persisted.profile,
            ui: persisted.ui,
            ..Self::default()
        };
        if context.auth.as_ref().is_some_and(|auth| !auth.is_valid_at(now)) {
            info!("Stored session has expired, signing out");
            context.auth = None;
            context.profile = None;
        }
        Ok(context)
    }
}

/// Where the serialized session lives between runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The stored JSON, `None` if nothing was saved.
    async fn read(&self) -> Result<Option<String>>;

    async fn write(&self, raw: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Saves the persisted part of `context`.
pub async fn save_session<S>(store: &S, context: &SessionContext) -> Result<()>
where
    S: SessionStore + ?Sized,
{
    store.write(&context.to_json()?).await
}

/// Loads the stored session, falling back to a fresh context.
///
/// A stored value that cannot be restored is logged, cleared and replaced by a fresh context.
/// Only storage failures are returned as errors.
pub async fn load_session<S>(store: &S, now: DateTime<Utc>) -> Result<SessionContext>
where
    S: SessionStore + ?Sized,
{
    let Some(raw) = store.read().await? else {
        debug!("No stored session");
        return Ok(SessionContext::new());
    };
    match SessionContext::restore(&raw, now) {
        Ok(context) => Ok(context),
        Err(e) => {
            warn!("Discarding unreadable stored session: {}", e);
            store.clear().await?;
            Ok(SessionContext::new())
        }
    }
}

/// Session kept in a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn read(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, raw: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, raw).await?;
        debug!("Session written to {:?}", self.path);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session kept in memory; nothing survives the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.read().await.clone())
    }

    async fn write(&self, raw: &str) -> Result<()> {
        *self.slot.write().await = Some(raw.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::Duration;

    fn auth_until(expires_at: DateTime<Utc>) -> AuthSession {
        AuthSession {
            user_id: 7,
            email: "ops@bondportal.io".to_string(),
            role: Role::Admin,
            token: "token-7".to_string(),
            expires_at,
        }
    }

    fn profile() -> Profile {
        Profile {
            name: "Ops".to_string(),
            kyc_status: KycStatus::Approved,
        }
    }

    #[test]
    fn test_notifications() {
        let mut context = SessionContext::new();
        let first = context.notify(NotificationLevel::Info, "Welcome back");
        let second = context.notify(NotificationLevel::Warning, "KYC review pending");
        assert_eq!(context.unread_count(), 2);

        assert!(context.mark_read(first));
        assert!(!context.mark_read(99));
        assert_eq!(context.unread_count(), 1);

        assert!(context.dismiss(second));
        assert!(!context.dismiss(second));
        assert_eq!(context.notifications().len(), 1);

        context.notify(NotificationLevel::Success, "Saved");
        context.mark_all_read();
        assert_eq!(context.unread_count(), 0);
    }

    #[test]
    fn test_restore_keeps_auth_profile_and_ui_only() {
        let now = Utc::now();
        let mut context = SessionContext::new();
        context.sign_in(auth_until(now + Duration::hours(1)), profile());
        context.ui_mut().dark_mode = true;
        context.notify(NotificationLevel::Info, "not persisted");

        let restored = SessionContext::restore(&context.to_json().unwrap(), now).unwrap();
        assert_eq!(restored.auth(), context.auth());
        assert_eq!(restored.profile(), context.profile());
        assert!(restored.ui().dark_mode);
        assert!(restored.notifications().is_empty());
        assert!(restored.is_admin(now));
    }

    #[test]
    fn test_restore_drops_expired_auth() {
        let now = Utc::now();
        let mut context = SessionContext::new();
        context.sign_in(auth_until(now - Duration::minutes(1)), profile());
        context.ui_mut().sidebar_collapsed = true;

        let restored = SessionContext::restore(&context.to_json().unwrap(), now).unwrap();
        assert!(restored.auth().is_none());
        assert!(restored.profile().is_none());
        assert!(!restored.is_authenticated(now));
        assert!(restored.ui().sidebar_collapsed);
    }

    #[test]
    fn test_restore_rejects_other_versions() {
        let raw = r#"{"version":99,"auth":null,"profile":null}"#;
        assert!(matches!(
            SessionContext::restore(raw, Utc::now()),
            Err(Error::Session { .. })
        ));
        assert!(matches!(
            SessionContext::restore("not json", Utc::now()),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_sign_out_keeps_ui_flags() {
        let now = Utc::now();
        let mut context = SessionContext::new();
        context.sign_in(auth_until(now + Duration::hours(1)), profile());
        context.ui_mut().dismissed_banners.push("launch".to_string());
        context.notify(NotificationLevel::Info, "hello");

        context.sign_out();
        assert!(!context.is_authenticated(now));
        assert!(context.notifications().is_empty());
        assert_eq!(context.ui().dismissed_banners, vec!["launch".to_string()]);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        let now = Utc::now();
        assert_eq!(load_session(&store, now).await?, SessionContext::new());

        let mut context = SessionContext::new();
        context.sign_in(auth_until(now + Duration::hours(2)), profile());
        save_session(&store, &context).await?;
        assert!(store.path().exists());

        let loaded = load_session(&store, now).await?;
        assert_eq!(loaded.auth(), context.auth());

        store.clear().await?;
        assert!(store.read().await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_store_falls_back_to_fresh_context() -> Result<()> {
        let store = MemorySessionStore::new();
        store.write("{broken").await?;

        let context = load_session(&store, Utc::now()).await?;
        assert_eq!(context, SessionContext::new());
        assert!(store.read().await?.is_none());
        Ok(())
    }
}
