//! Read-only lookups for reference entities (categories, tags, users).
//!
//! The workflow core stores only their ids; lifecycle of these entities
//! belongs to an external system. The memory adapter is the development
//! and test stand-in.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait Directory: Send + Sync {
    async fn category_exists(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Resolves tag ids to the subset that actually exists. Callers compare
    /// counts to detect dangling references.
    async fn resolve_tags(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>>;
    async fn user_exists(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Default)]
pub struct MemoryDirectory {
    categories: RwLock<HashSet<Uuid>>,
    tags: RwLock<HashSet<Uuid>>,
    users: RwLock<HashSet<Uuid>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, id: Uuid) {
        self.categories.write().expect("directory lock").insert(id);
    }

    pub fn add_tag(&self, id: Uuid) {
        self.tags.write().expect("directory lock").insert(id);
    }

    pub fn add_user(&self, id: Uuid) {
        self.users.write().expect("directory lock").insert(id);
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn category_exists(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.categories.read().expect("directory lock").contains(&id))
    }

    async fn resolve_tags(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Uuid>> {
        let tags = self.tags.read().expect("directory lock");
        Ok(ids.iter().copied().filter(|id| tags.contains(id)).collect())
    }

    async fn user_exists(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.users.read().expect("directory lock").contains(&id))
    }
}
