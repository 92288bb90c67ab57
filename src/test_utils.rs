use crate::{config::PoolConfig, repository::Repository};

use std::{sync::Arc, time::Duration};

use tempfile::TempDir;

pub struct TestStore {
    // Keeps the database directory alive for the duration of the test
    pub _temp_dir: TempDir,
    pub repo: Arc<Repository>,
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStore {
    pub fn new() -> Self {
        Self::with_pool(PoolConfig {
            max_size: 4,
            connection_timeout: Duration::from_secs(5),
        })
    }

    pub fn with_pool(pool: PoolConfig) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("notes.db");

        let repo = Repository::new(&path, &pool).expect("failed to open store");
        repo.migrate().expect("failed to migrate store");

        Self {
            _temp_dir: temp_dir,
            repo: Arc::new(repo),
        }
    }
}
