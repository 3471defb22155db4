use crate::error::AppError;
use crate::site::access::{Permission, RoleAccessPolicy, RoleAssignment};
use crate::site::block_manager::{BlockInstanceRecord, BlockStore, BlockType};
use crate::site::context::{check_context_id, Context, ContextDirectory, ContextLevel, SYSTEM_CONTEXT_ID};
use crate::site::forms::EditFormRegistry;
use crate::site::page::{EditedPage, EditedPageStore};
use crate::site::strings::{LanguagePack, StringTable};
use crate::site::UserId;
use crate::utils::param_validation::is_valid_plugin_name;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize)]
pub struct ContextRecord {
    pub id: i64,
    pub level: ContextLevel,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub hidden: bool,
}

/// Read-only snapshot of the host site, as stored in `SITE_DATA_FILE`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteSnapshot {
    #[serde(default)]
    pub admins: Vec<UserId>,
    #[serde(default)]
    pub contexts: Vec<ContextRecord>,
    #[serde(default)]
    pub roles: HashMap<String, HashMap<String, Permission>>,
    #[serde(default)]
    pub role_assignments: Vec<RoleAssignment>,
    #[serde(default)]
    pub block_types: Vec<BlockType>,
    #[serde(default)]
    pub block_instances: Vec<BlockInstanceRecord>,
    #[serde(default)]
    pub layouts: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub edited_pages: HashMap<String, EditedPage>,
    #[serde(default)]
    pub strings: StringTable,
}

impl SiteSnapshot {
    #[instrument]
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let snapshot = Self::from_json(&raw)?;
        info!(
            contexts = snapshot.contexts.len(),
            block_types = snapshot.block_types.len(),
            block_instances = snapshot.block_instances.len(),
            "Loaded site snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let snapshot: SiteSnapshot = serde_json::from_str(raw)
            .map_err(|e| AppError::SiteData(format!("Failed to parse site snapshot: {}", e)))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), AppError> {
        let mut ids = HashSet::new();
        for ctx in &self.contexts {
            check_context_id(ctx.id).map_err(|e| AppError::SiteData(e.to_string()))?;
            if !ids.insert(ctx.id) {
                return Err(AppError::SiteData(format!("Duplicate context id {}", ctx.id)));
            }
            let is_root = ctx.id == SYSTEM_CONTEXT_ID;
            if is_root != (ctx.level == ContextLevel::System) || is_root != ctx.parent.is_none() {
                return Err(AppError::SiteData(format!(
                    "Context {} must be the parentless system context or a child context, not both",
                    ctx.id
                )));
            }
        }
        for ctx in &self.contexts {
            if let Some(parent) = ctx.parent {
                if !ids.contains(&parent) {
                    return Err(AppError::SiteData(format!("Context {} has unknown parent {}", ctx.id, parent)));
                }
            }
        }

        let mut names = HashSet::new();
        for block in &self.block_types {
            if !is_valid_plugin_name(&block.name) {
                return Err(AppError::SiteData(format!("Invalid block plugin name {:?}", block.name)));
            }
            if !names.insert(block.name.as_str()) {
                return Err(AppError::SiteData(format!("Duplicate block type {}", block.name)));
            }
        }
        Ok(())
    }

    /// Splits the snapshot into the role policy, the string pack, the form
    /// registry and the remaining storage.
    pub fn into_parts(self, language: &str) -> SiteParts {
        let access = RoleAccessPolicy::new(self.admins, self.roles, self.role_assignments);
        let strings = LanguagePack::new(language, self.strings);
        let mut forms = EditFormRegistry::new();
        for block in &self.block_types {
            if let Some(spec) = &block.edit_form {
                forms.register(&block.name, spec);
            }
        }
        let storage = SiteStorage {
            contexts: self.contexts.into_iter().map(|c| (c.id, c)).collect(),
            block_types: self.block_types,
            block_instances: self.block_instances,
            layouts: self.layouts,
            edited_pages: self.edited_pages,
        };
        SiteParts { access, strings, forms, storage }
    }
}

pub struct SiteParts {
    pub access: RoleAccessPolicy,
    pub strings: LanguagePack,
    pub forms: EditFormRegistry,
    pub storage: SiteStorage,
}

/// Contexts, blocks and edit sessions of the snapshot.
#[derive(Debug, Default)]
pub struct SiteStorage {
    contexts: HashMap<i64, ContextRecord>,
    block_types: Vec<BlockType>,
    block_instances: Vec<BlockInstanceRecord>,
    layouts: HashMap<String, Vec<String>>,
    edited_pages: HashMap<String, EditedPage>,
}

impl ContextDirectory for SiteStorage {
    fn instance_by_id(&self, id: i64) -> Result<Context, AppError> {
        check_context_id(id)?;
        let record = self
            .contexts
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Context {} does not exist", id)))?;

        let mut path = vec![record.id];
        let mut hidden = record.hidden;
        let mut current = record.parent;
        while let Some(parent_id) = current {
            // Parents are checked on load; a cycle is the only way to revisit.
            if path.contains(&parent_id) {
                return Err(AppError::SiteData(format!("Context {} has a cyclic ancestry", id)));
            }
            let parent = self
                .contexts
                .get(&parent_id)
                .ok_or_else(|| AppError::SiteData(format!("Context {} has unknown parent {}", id, parent_id)))?;
            hidden |= parent.hidden;
            path.push(parent_id);
            current = parent.parent;
        }
        path.reverse();

        Ok(Context { id: record.id, level: record.level, hidden, path })
    }
}

impl EditedPageStore for SiteStorage {
    fn retrieve_edited_page(&self, hash: &str) -> Result<EditedPage, AppError> {
        self.edited_pages
            .get(hash)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No edited page is stored under hash {:?}", hash)))
    }
}

impl BlockStore for SiteStorage {
    fn block_instance_records(&self) -> Vec<BlockInstanceRecord> {
        self.block_instances.clone()
    }

    fn installed_block_types(&self) -> Vec<BlockType> {
        self.block_types.clone()
    }

    fn block_type(&self, name: &str) -> Option<BlockType> {
        self.block_types.iter().find(|b| b.name == name).cloned()
    }

    fn layout_regions(&self, layout: &str) -> Vec<String> {
        self.layouts.get(layout).cloned().unwrap_or_default()
    }
}
