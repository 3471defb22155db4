use crate::error::AppError;
use crate::site::access::AccessPolicy;
use crate::site::context::{Context, ContextDirectory};
use crate::site::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// The page a request operates on. Built once by `resolve_page` and passed
/// explicitly to everything downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub context: Context,
    pub page_type: String,
    pub layout: String,
    pub subpage: String,
}

impl PageContext {
    pub fn page_type_patterns(&self) -> Vec<String> {
        matching_page_type_patterns(&self.page_type)
    }
}

/// Page state kept for an in-progress edit session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditedPage {
    pub context: i64,
    pub page_type: String,
    pub page_layout: String,
    #[serde(default)]
    pub subpage: String,
}

pub trait EditedPageStore: Send + Sync {
    /// `NotFound` when no page was stored under `hash`.
    fn retrieve_edited_page(&self, hash: &str) -> Result<EditedPage, AppError>;
}

/// How the caller identified the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDescriptor {
    EditSession {
        hash: String,
    },
    Explicit {
        context_id: i64,
        page_type: String,
        layout: String,
        subpage: String,
    },
}

/// Collaborators needed to turn a descriptor into a page.
pub struct PageResolver<'a> {
    pub contexts: &'a dyn ContextDirectory,
    pub access: &'a dyn AccessPolicy,
    pub edited_pages: &'a dyn EditedPageStore,
}

impl PageResolver<'_> {
    /// Resolves and access-checks the page. Nothing is built for a context
    /// the user may not enter.
    #[instrument(skip(self))]
    pub fn resolve_page(&self, user: UserId, descriptor: &PageDescriptor) -> Result<PageContext, AppError> {
        match descriptor {
            PageDescriptor::EditSession { hash } => {
                let stored = self.edited_pages.retrieve_edited_page(hash)?;
                debug!(context_id = stored.context, page_type = %stored.page_type, "Rehydrating edited page");
                let context = self.contexts.instance_by_id(stored.context)?;
                self.access.validate_context(user, &context)?;
                Ok(PageContext {
                    context,
                    page_type: stored.page_type,
                    layout: stored.page_layout,
                    subpage: stored.subpage,
                })
            }
            PageDescriptor::Explicit { context_id, page_type, layout, subpage } => {
                let context = self.contexts.instance_by_id(*context_id)?;
                self.access.validate_context(user, &context)?;
                Ok(PageContext {
                    context,
                    page_type: page_type.clone(),
                    layout: layout.clone(),
                    subpage: subpage.clone(),
                })
            }
        }
    }
}

/// Patterns a page type answers to, most specific first:
/// `course-view-topics` gives `course-view-topics`, `course-view-topics-*`,
/// `course-view-*`, `course-*` and `*`.
pub fn matching_page_type_patterns(page_type: &str) -> Vec<String> {
    let mut patterns = vec![page_type.to_string()];
    let mut bits: Vec<&str> = page_type.split('-').collect();
    while !bits.is_empty() {
        patterns.push(format!("{}-*", bits.join("-")));
        bits.pop();
    }
    patterns.push("*".to_string());
    patterns
}
