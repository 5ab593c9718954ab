//! Database seeding
//!
//! Seeders are registered by class name in a [`SeederRegistry`]. A seeder is
//! only run when its source file `{seeders_path}/{Name}.{ext}` exists, so the
//! registry and the seeders directory stay in step.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ArcanoxError, ArcanoxResult};
use crate::schema::Schema;

/// Seeder run when no class is named
pub const DEFAULT_SEEDER: &str = "DatabaseSeeder";

#[async_trait]
pub trait Seeder: Send + Sync {
    async fn run(&self, schema: &Schema) -> ArcanoxResult<()>;
}

pub type SeederFactory = Arc<dyn Fn() -> Box<dyn Seeder> + Send + Sync>;

#[derive(Clone, Default)]
pub struct SeederRegistry {
    factories: BTreeMap<String, SeederFactory>,
}

impl std::fmt::Debug for SeederRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeederRegistry")
            .field("seeders", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SeederRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, S>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Seeder + 'static,
    {
        self.factories.insert(
            name.to_string(),
            Arc::new(move || Box::new(factory()) as Box<dyn Seeder>),
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Seeder>> {
        self.factories.get(name).map(|factory| factory())
    }
}

/// Find `{dir}/{name}.{ext}` for the first extension that exists
pub async fn locate_seeder(
    dir: &Path,
    name: &str,
    extensions: &[String],
) -> ArcanoxResult<PathBuf> {
    for ext in extensions {
        let candidate = dir.join(format!("{}.{}", name, ext));
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Ok(candidate);
        }
    }

    Err(ArcanoxError::validation(format!(
        "Seeder '{}' not found in {}",
        name,
        dir.display()
    )))
}
