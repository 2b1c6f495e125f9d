use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// One async mutex per user. Goal writes for a user run one at a time so the
/// deactivate-then-write sequence never interleaves with another activation.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(user_id).or_default().clone()
        };
        slot.lock_owned().await
    }
}
