//! Host site collaborators: contexts and access, edited pages, the block
//! subsystem, edit forms and language strings. Each sits behind a trait so the
//! endpoint can run against the bundled snapshot or a substitute.

pub mod access;
pub mod block_manager;
pub mod context;
pub mod eligibility;
#[cfg(test)]
pub mod fixtures;
pub mod forms;
pub mod page;
pub mod store;
pub mod strings;

use std::sync::Arc;

use access::AccessPolicy;
use block_manager::BlockStore;
use context::ContextDirectory;
use eligibility::{BlockEligibilityProvider, StandardEligibility};
use forms::BlockFormRegistry;
use page::EditedPageStore;
use store::SiteSnapshot;
use strings::StringManager;

pub type UserId = u64;

#[derive(Clone)]
pub struct SiteServices {
    pub contexts: Arc<dyn ContextDirectory>,
    pub access: Arc<dyn AccessPolicy>,
    pub edited_pages: Arc<dyn EditedPageStore>,
    pub blocks: Arc<dyn BlockStore>,
    pub eligibility: Arc<dyn BlockEligibilityProvider>,
    pub forms: Arc<dyn BlockFormRegistry>,
    pub strings: Arc<dyn StringManager>,
}

impl SiteServices {
    /// Wires the bundled implementations over one snapshot.
    pub fn from_snapshot(snapshot: SiteSnapshot, language: &str) -> Self {
        let parts = snapshot.into_parts(language);
        let storage = Arc::new(parts.storage);
        let access: Arc<dyn AccessPolicy> = Arc::new(parts.access);
        let strings: Arc<dyn StringManager> = Arc::new(parts.strings);
        let blocks: Arc<dyn BlockStore> = storage.clone();
        let eligibility = Arc::new(StandardEligibility::new(blocks.clone(), access.clone(), strings.clone()));

        Self {
            contexts: storage.clone(),
            access,
            edited_pages: storage,
            blocks,
            eligibility,
            forms: Arc::new(parts.forms),
            strings,
        }
    }
}

impl std::fmt::Debug for SiteServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteServices").finish_non_exhaustive()
    }
}
