use axum::Router;
use std::sync::Arc;

use clubstats::{build_router, AppConfig, AppState, InMemoryClubRepository};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub store: Arc<InMemoryClubRepository>,
}

pub struct TestSetupBuilder {
    config: AppConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    #[allow(dead_code)]
    pub fn with_recent_training_limit(mut self, limit: usize) -> Self {
        self.config.recent_training_limit = limit;
        self
    }

    pub fn build(self) -> TestSetup {
        let store = Arc::new(InMemoryClubRepository::new());
        let state = AppState::new(store.clone(), store.clone(), self.config);

        TestSetup {
            app: build_router(state),
            store,
        }
    }
}
