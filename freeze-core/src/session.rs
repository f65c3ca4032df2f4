//! Stable anonymous session id used to correlate telemetry from one device.

use uuid::Uuid;

use crate::local::{KeyValueStore, SESSION_ID_KEY};
use crate::models::MAX_SESSION_ID_LEN;

/// Returns the stored session id, creating and persisting one if needed.
/// If persisting fails the fresh id is still returned for this call.
pub fn session_id<K: KeyValueStore>(kv: &K) -> String {
    match kv.get(SESSION_ID_KEY) {
        Ok(Some(id)) if is_valid(&id) => return id,
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Could not read session id"),
    }

    let id = Uuid::new_v4().to_string();
    if let Err(e) = kv.set(SESSION_ID_KEY, &id) {
        tracing::warn!(error = %e, "Could not persist session id");
    }
    id
}

fn is_valid(id: &str) -> bool {
    !id.trim().is_empty() && id.len() <= MAX_SESSION_ID_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::MemoryStore;

    #[test]
    fn id_is_stable_across_calls() {
        let kv = MemoryStore::new();
        let first = session_id(&kv);
        assert_eq!(session_id(&kv), first);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn invalid_stored_id_is_replaced() {
        let kv = MemoryStore::with_values([(SESSION_ID_KEY, "")]);
        let id = session_id(&kv);
        assert!(!id.is_empty());
        assert_eq!(kv.get(SESSION_ID_KEY).unwrap(), Some(id));
    }
}
