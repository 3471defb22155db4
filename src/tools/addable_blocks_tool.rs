use crate::config::Config;
use crate::error::AppError;
use crate::site::block_manager::PageBlocks;
use crate::site::page::{PageDescriptor, PageResolver};
use crate::site::SiteServices;
use crate::utils::param_validation::{
    clean_alpha, clean_alphanumext, clean_alphanumext_or, clean_int, clean_text_or, is_valid_plugin_name,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Raw arguments; every field is typed and cleaned by `validate`.
#[derive(Debug, Default, Deserialize)]
pub struct FetchAddableBlocksParams {
    pub pagecontextid: Option<Value>,
    pub pagetype: Option<Value>,
    pub pagelayout: Option<Value>,
    pub subpage: Option<Value>,
    pub pagehash: Option<Value>,
    #[serde(flatten)]
    pub unexpected: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParams {
    pub page_context_id: i64,
    pub page_type: String,
    pub page_layout: String,
    pub subpage: String,
    pub page_hash: String,
}

impl FetchAddableBlocksParams {
    pub fn validate(&self) -> Result<ValidatedParams, AppError> {
        if !self.unexpected.is_empty() {
            let keys: Vec<&str> = self.unexpected.keys().map(String::as_str).collect();
            return Err(AppError::InvalidParameter(format!(
                "Unexpected keys ({}) detected in parameter array.",
                keys.join(", ")
            )));
        }
        Ok(ValidatedParams {
            page_context_id: clean_int("pagecontextid", self.pagecontextid.as_ref())?,
            page_type: clean_alphanumext("pagetype", self.pagetype.as_ref())?,
            page_layout: clean_alpha("pagelayout", self.pagelayout.as_ref())?,
            subpage: clean_text_or("subpage", self.subpage.as_ref(), "")?,
            page_hash: clean_alphanumext_or("pagehash", self.pagehash.as_ref(), "")?,
        })
    }
}

impl ValidatedParams {
    /// A non-empty hash wins over everything else.
    pub fn descriptor(&self) -> PageDescriptor {
        if !self.page_hash.is_empty() {
            PageDescriptor::EditSession { hash: self.page_hash.clone() }
        } else {
            PageDescriptor::Explicit {
                context_id: self.page_context_id,
                page_type: self.page_type.clone(),
                layout: self.page_layout.clone(),
                subpage: self.subpage.clone(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddableBlockInfo {
    pub name: String,
    pub title: String,
    pub blockform: Option<String>,
}

#[derive(Debug)]
pub struct AddableBlocksFetcher {
    config: Arc<Config>,
    site: SiteServices,
}

impl AddableBlocksFetcher {
    pub fn new(config: Arc<Config>, site: SiteServices) -> Self {
        Self { config, site }
    }

    #[instrument(skip(self, params), fields(user = self.config.caller_user_id))]
    pub async fn fetch_addable_blocks(&self, params: &FetchAddableBlocksParams) -> Result<Vec<AddableBlockInfo>, AppError> {
        let params = params.validate()?;
        let descriptor = params.descriptor();
        debug!(?descriptor, "Fetching addable blocks");

        let resolver = PageResolver {
            contexts: self.site.contexts.as_ref(),
            access: self.site.access.as_ref(),
            edited_pages: self.site.edited_pages.as_ref(),
        };
        let page = resolver.resolve_page(self.config.caller_user_id, &descriptor)?;

        let mut blocks = PageBlocks::new(&page, self.site.blocks.as_ref());
        blocks.load_blocks(true);
        blocks.create_all_block_instances();
        debug!(instances = blocks.instances().len(), "Page blocks instantiated");

        let addable = self.site.eligibility.addable_blocks(self.config.caller_user_id, &blocks)?;

        let result: Vec<AddableBlockInfo> = addable
            .into_iter()
            .map(|block| {
                let form = self.site.forms.edit_form(&block.name);
                AddableBlockInfo {
                    title: self.site.strings.get_string("pluginname", &block.component()),
                    blockform: form.display_when_adding.then_some(form.class_name),
                    name: block.name,
                }
            })
            .collect();

        clean_returnvalue(&result)?;
        debug!(count = result.len(), "Addable blocks resolved");
        Ok(result)
    }
}

/// Checks the result against the published return shape.
fn clean_returnvalue(blocks: &[AddableBlockInfo]) -> Result<(), AppError> {
    if let Some(bad) = blocks.iter().find(|b| !is_valid_plugin_name(&b.name)) {
        return Err(AppError::InvalidResponse(format!("name => {:?} is not a valid plugin name", bad.name)));
    }
    Ok(())
}
