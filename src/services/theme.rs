use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::models::theme::ThemeMode;

/// Per-user light/dark preference. Users without an entry get the default.
#[derive(Clone, Default)]
pub struct ThemeRegistry {
    default_mode: ThemeMode,
    modes: Arc<RwLock<HashMap<String, ThemeMode>>>,
}

impl ThemeRegistry {
    pub fn new(default_mode: ThemeMode) -> Self {
        Self {
            default_mode,
            modes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn mode(&self, uid: &str) -> ThemeMode {
        self.modes
            .read()
            .await
            .get(uid)
            .copied()
            .unwrap_or(self.default_mode)
    }

    /// Flip the user's mode and return the new one.
    pub async fn toggle(&self, uid: &str) -> ThemeMode {
        let mut modes = self.modes.write().await;
        let mode = modes.entry(uid.to_string()).or_insert(self.default_mode);
        *mode = mode.toggled();
        *mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_user_gets_default() {
        let registry = ThemeRegistry::new(ThemeMode::Dark);
        assert_eq!(registry.mode("u1").await, ThemeMode::Dark);
    }

    #[tokio::test]
    async fn test_toggle_is_per_user() {
        let registry = ThemeRegistry::new(ThemeMode::Light);
        assert_eq!(registry.toggle("u1").await, ThemeMode::Dark);
        assert_eq!(registry.mode("u1").await, ThemeMode::Dark);
        assert_eq!(registry.mode("u2").await, ThemeMode::Light);
        assert_eq!(registry.toggle("u1").await, ThemeMode::Light);
    }
}
