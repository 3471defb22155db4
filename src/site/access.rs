use crate::error::AppError;
use crate::site::context::Context;
use crate::site::UserId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Capability that lets a user enter hidden contexts.
pub const VIEW_HIDDEN_CAPABILITY: &str = "moodle/course:viewhiddencourses";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Allow,
    Prohibit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user: UserId,
    pub role: String,
    pub context: i64,
}

pub trait AccessPolicy: Send + Sync {
    /// Fails with `AccessDenied` when `user` may not operate in `context`.
    fn validate_context(&self, user: UserId, context: &Context) -> Result<(), AppError>;

    fn has_capability(&self, user: UserId, capability: &str, context: &Context) -> bool;
}

/// Role based access: site admins bypass every check, everyone else needs a
/// role assignment somewhere on the context path.
#[derive(Debug, Default)]
pub struct RoleAccessPolicy {
    admins: HashSet<UserId>,
    roles: HashMap<String, HashMap<String, Permission>>,
    assignments: Vec<RoleAssignment>,
}

impl RoleAccessPolicy {
    pub fn new(
        admins: impl IntoIterator<Item = UserId>,
        roles: HashMap<String, HashMap<String, Permission>>,
        assignments: Vec<RoleAssignment>,
    ) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            roles,
            assignments,
        }
    }

    pub fn is_site_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    fn roles_on_path<'a>(&'a self, user: UserId, context: &'a Context) -> impl Iterator<Item = &'a str> + 'a {
        self.assignments
            .iter()
            .filter(move |a| a.user == user && context.path.contains(&a.context))
            .map(|a| a.role.as_str())
    }
}

impl AccessPolicy for RoleAccessPolicy {
    #[instrument(skip(self, context), fields(context_id = context.id))]
    fn validate_context(&self, user: UserId, context: &Context) -> Result<(), AppError> {
        if self.is_site_admin(user) {
            return Ok(());
        }
        if self.roles_on_path(user, context).next().is_none() {
            debug!("User has no role on the context path");
            return Err(AppError::AccessDenied(format!(
                "User {} cannot access context {}",
                user, context.id
            )));
        }
        if context.hidden && !self.has_capability(user, VIEW_HIDDEN_CAPABILITY, context) {
            debug!("Context is hidden from the user");
            return Err(AppError::AccessDenied(format!(
                "Context {} is hidden from user {}",
                context.id, user
            )));
        }
        Ok(())
    }

    fn has_capability(&self, user: UserId, capability: &str, context: &Context) -> bool {
        if self.is_site_admin(user) {
            return true;
        }
        let mut allowed = false;
        for role in self.roles_on_path(user, context) {
            match self.roles.get(role).and_then(|caps| caps.get(capability)) {
                Some(Permission::Prohibit) => return false,
                Some(Permission::Allow) => allowed = true,
                None => {}
            }
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::context::ContextLevel;

    fn course(hidden: bool) -> Context {
        Context { id: 15, level: ContextLevel::Course, hidden, path: vec![1, 3, 15] }
    }

    fn policy() -> RoleAccessPolicy {
        let mut roles = HashMap::new();
        roles.insert(
            "editingteacher".to_string(),
            HashMap::from([
                ("moodle/site:manageblocks".to_string(), Permission::Allow),
                ("block/html:addinstance".to_string(), Permission::Allow),
            ]),
        );
        roles.insert(
            "restricted".to_string(),
            HashMap::from([("block/html:addinstance".to_string(), Permission::Prohibit)]),
        );
        roles.insert("student".to_string(), HashMap::new());
        RoleAccessPolicy::new(
            [2],
            roles,
            vec![
                RoleAssignment { user: 5, role: "editingteacher".into(), context: 15 },
                RoleAssignment { user: 6, role: "student".into(), context: 3 },
                RoleAssignment { user: 7, role: "editingteacher".into(), context: 1 },
                RoleAssignment { user: 7, role: "restricted".into(), context: 15 },
            ],
        )
    }

    #[test]
    fn assignment_on_path_grants_access() {
        let p = policy();
        assert!(p.validate_context(5, &course(false)).is_ok());
        assert!(p.validate_context(6, &course(false)).is_ok());
        assert!(matches!(p.validate_context(9, &course(false)), Err(AppError::AccessDenied(_))));
    }

    #[test]
    fn hidden_context_needs_view_hidden() {
        let p = policy();
        assert!(matches!(p.validate_context(5, &course(true)), Err(AppError::AccessDenied(_))));
        assert!(p.validate_context(2, &course(true)).is_ok());
    }

    #[test]
    fn prohibit_overrides_allow() {
        let p = policy();
        assert!(p.has_capability(5, "block/html:addinstance", &course(false)));
        assert!(!p.has_capability(7, "block/html:addinstance", &course(false)));
        assert!(p.has_capability(7, "moodle/site:manageblocks", &course(false)));
        assert!(!p.has_capability(6, "moodle/site:manageblocks", &course(false)));
    }

    #[test]
    fn admins_hold_everything() {
        let p = policy();
        assert!(p.has_capability(2, "block/anything:addinstance", &course(false)));
    }
}
