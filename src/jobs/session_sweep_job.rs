use tracing::info;

use crate::auth::session::SessionStore;
use crate::errors::AppError;

/// Drop expired sessions from the store.
///
/// Expired entries are already removed lazily when their cookie is next
/// presented; this pass catches the sessions nobody touches again.
pub async fn sweep_sessions(sessions: SessionStore) -> Result<usize, AppError> {
    let removed = sessions.cleanup_expired();
    if removed > 0 {
        info!("🧹 Session sweep removed {} expired sessions", removed);
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sweep_on_fresh_store_removes_nothing() {
        let sessions = SessionStore::new(1);
        sessions.login(1);
        let removed = sweep_sessions(sessions.clone()).await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(sessions.len(), 1);
    }
}
