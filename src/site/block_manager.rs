use crate::site::forms::EditFormSpec;
use crate::site::page::PageContext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// An installed block plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockType {
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Page format pattern -> allowed.
    #[serde(default)]
    pub applicable_formats: BTreeMap<String, bool>,
    #[serde(default)]
    pub edit_form: Option<EditFormSpec>,
}
fn default_true() -> bool { true }

impl BlockType {
    pub fn component(&self) -> String {
        format!("block_{}", self.name)
    }

    pub fn add_capability(&self) -> String {
        format!("block/{}:addinstance", self.name)
    }
}

/// A placed block as stored by the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInstanceRecord {
    pub block: String,
    pub parent_context: i64,
    #[serde(default)]
    pub show_in_subcontexts: bool,
    pub page_type_pattern: String,
    #[serde(default)]
    pub subpage_pattern: Option<String>,
    pub region: String,
}

impl BlockInstanceRecord {
    /// Whether this record is displayed on `page`.
    pub fn appears_on(&self, page: &PageContext, patterns: &[String]) -> bool {
        let context_matches = self.parent_context == page.context.id
            || (self.show_in_subcontexts && page.context.has_ancestor(self.parent_context));
        let subpage_matches = match &self.subpage_pattern {
            Some(subpage) => *subpage == page.subpage,
            None => true,
        };
        context_matches && subpage_matches && patterns.iter().any(|p| *p == self.page_type_pattern)
    }
}

/// Storage side of the block subsystem.
pub trait BlockStore: Send + Sync {
    fn block_instance_records(&self) -> Vec<BlockInstanceRecord>;

    /// Installed block types, in installation order.
    fn installed_block_types(&self) -> Vec<BlockType>;

    fn block_type(&self, name: &str) -> Option<BlockType>;

    /// Regions the layout offers; empty for unknown layouts.
    fn layout_regions(&self, layout: &str) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInstance {
    pub record: BlockInstanceRecord,
    pub block_type: BlockType,
}

/// The block collection of one page. Lives for a single request.
pub struct PageBlocks<'a> {
    page: &'a PageContext,
    store: &'a dyn BlockStore,
    loaded: Option<Vec<BlockInstanceRecord>>,
    instances: Vec<BlockInstance>,
}

impl<'a> PageBlocks<'a> {
    pub fn new(page: &'a PageContext, store: &'a dyn BlockStore) -> Self {
        Self { page, store, loaded: None, instances: Vec::new() }
    }

    pub fn page(&self) -> &PageContext {
        self.page
    }

    /// Loads the records placed on this page. Already loaded records are kept
    /// unless `force` is set.
    #[instrument(skip(self), fields(context_id = self.page.context.id, page_type = %self.page.page_type))]
    pub fn load_blocks(&mut self, force: bool) {
        if self.loaded.is_some() && !force {
            return;
        }
        let patterns = self.page.page_type_patterns();
        let records: Vec<BlockInstanceRecord> = self
            .store
            .block_instance_records()
            .into_iter()
            .filter(|r| r.appears_on(self.page, &patterns))
            .collect();
        debug!("Loaded {} block instance record(s)", records.len());
        self.loaded = Some(records);
        self.instances.clear();
    }

    /// Resolves every loaded record to its block type. Records whose plugin
    /// is not installed are skipped.
    pub fn create_all_block_instances(&mut self) {
        if self.loaded.is_none() {
            self.load_blocks(false);
        }
        let records = self.loaded.as_deref().unwrap_or_default();
        let mut instances = Vec::with_capacity(records.len());
        for record in records {
            match self.store.block_type(&record.block) {
                Some(block_type) => instances.push(BlockInstance { record: record.clone(), block_type }),
                None => warn!(block = %record.block, "Skipping instance of a block that is not installed"),
            }
        }
        self.instances = instances;
    }

    pub fn instances(&self) -> &[BlockInstance] {
        &self.instances
    }

    pub fn is_block_present(&self, name: &str) -> bool {
        self.instances.iter().any(|i| i.block_type.name == name)
    }

    pub fn regions(&self) -> Vec<String> {
        self.store.layout_regions(&self.page.layout)
    }
}

/// Whether a block with `applicable_formats` may appear on `page_format`.
/// The deepest matching format key wins; with no match, `all` decides.
pub fn block_allowed_in_format(applicable_formats: &BTreeMap<String, bool>, page_format: &str) -> bool {
    let mut accept = None;
    let mut max_depth: isize = -1;
    for (format, allowed) in applicable_formats {
        let pattern = format!("^{}.*$", regex::escape(format).replace(r"\*", "[^-]*"));
        let Ok(re) = Regex::new(&pattern) else {
            warn!(format = %format, "Ignoring unparsable applicable format");
            continue;
        };
        let depth = format.matches('-').count() as isize;
        if re.is_match(page_format) && depth > max_depth {
            max_depth = depth;
            accept = Some(*allowed);
        }
    }
    accept.unwrap_or_else(|| applicable_formats.get("all").copied().unwrap_or(false))
}
