use std::sync::{Arc, Mutex, PoisonError};

/// Client-side storage for the bearer token.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: String);
    fn clear(&self);
}

/// Process-local token slot. Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: String) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
