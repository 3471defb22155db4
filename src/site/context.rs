use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Id of the system context, the root of every context path.
pub const SYSTEM_CONTEXT_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextLevel {
    System,
    User,
    Coursecat,
    Course,
    Module,
    Block,
}

/// An access-control scope node, with its ancestry resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    pub id: i64,
    pub level: ContextLevel,
    pub hidden: bool,
    /// Ids from the root down to and including this context.
    pub path: Vec<i64>,
}

impl Context {
    /// Strict ancestry: a context is not its own ancestor.
    pub fn has_ancestor(&self, id: i64) -> bool {
        self.id != id && self.path.contains(&id)
    }
}

pub trait ContextDirectory: Send + Sync {
    /// `InvalidContext` for ids that can never name a context, `NotFound`
    /// for ids with no record.
    fn instance_by_id(&self, id: i64) -> Result<Context, AppError>;
}

pub(crate) fn check_context_id(id: i64) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::InvalidContext(format!("Invalid context id specified: {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_module() -> Context {
        Context { id: 30, level: ContextLevel::Module, hidden: false, path: vec![1, 3, 15, 30] }
    }

    #[test]
    fn ancestry_excludes_self() {
        let ctx = course_module();
        assert!(ctx.has_ancestor(1));
        assert!(ctx.has_ancestor(15));
        assert!(!ctx.has_ancestor(30));
        assert!(!ctx.has_ancestor(16));
    }

    #[test]
    fn non_positive_ids_are_invalid() {
        assert!(matches!(check_context_id(0), Err(AppError::InvalidContext(_))));
        assert!(matches!(check_context_id(-4), Err(AppError::InvalidContext(_))));
        assert!(check_context_id(1).is_ok());
    }
}
