use crate::error::AppError;
use crate::site::access::AccessPolicy;
use crate::site::block_manager::{block_allowed_in_format, BlockStore, BlockType, PageBlocks};
use crate::site::strings::StringManager;
use crate::site::UserId;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Capability that lets a user edit blocks on a page at all.
pub const MANAGE_BLOCKS_CAPABILITY: &str = "moodle/site:manageblocks";

/// Decides which block types may still be added to a loaded page. The
/// returned order is the order the caller presents.
pub trait BlockEligibilityProvider: Send + Sync {
    fn addable_blocks(&self, user: UserId, blocks: &PageBlocks<'_>) -> Result<Vec<BlockType>, AppError>;
}

/// Eligibility rules of the bundled block subsystem. Region capacity is not
/// taken into account.
pub struct StandardEligibility {
    store: Arc<dyn BlockStore>,
    access: Arc<dyn AccessPolicy>,
    strings: Arc<dyn StringManager>,
}

impl StandardEligibility {
    pub fn new(store: Arc<dyn BlockStore>, access: Arc<dyn AccessPolicy>, strings: Arc<dyn StringManager>) -> Self {
        Self { store, access, strings }
    }
}

impl BlockEligibilityProvider for StandardEligibility {
    #[instrument(skip(self, blocks))]
    fn addable_blocks(&self, user: UserId, blocks: &PageBlocks<'_>) -> Result<Vec<BlockType>, AppError> {
        let page = blocks.page();
        if blocks.regions().is_empty() {
            debug!(layout = %page.layout, "Layout has no block regions");
            return Ok(Vec::new());
        }
        if !self.access.has_capability(user, MANAGE_BLOCKS_CAPABILITY, &page.context) {
            debug!("User cannot manage blocks on this page");
            return Ok(Vec::new());
        }

        let mut addable: Vec<(String, BlockType)> = self
            .store
            .installed_block_types()
            .into_iter()
            .filter(|b| b.visible)
            .filter(|b| !blocks.is_block_present(&b.name))
            .filter(|b| block_allowed_in_format(&b.applicable_formats, &page.page_type))
            .filter(|b| self.access.has_capability(user, &b.add_capability(), &page.context))
            .map(|b| (self.strings.get_string("pluginname", &b.component()).to_lowercase(), b))
            .collect();
        // Titles compare case-insensitively; equal titles fall back to the plugin name.
        addable.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then_with(|| a.name.cmp(&b.name)));

        debug!("{} block type(s) addable", addable.len());
        Ok(addable.into_iter().map(|(_, b)| b).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::fixtures::SAMPLE_SITE;
    use crate::site::page::PageContext;
    use crate::site::store::SiteSnapshot;
    use crate::site::SiteServices;

    fn services() -> SiteServices {
        SiteServices::from_snapshot(SiteSnapshot::from_json(SAMPLE_SITE).unwrap(), "en")
    }

    fn page(services: &SiteServices, context_id: i64, page_type: &str, layout: &str, subpage: &str) -> PageContext {
        PageContext {
            context: services.contexts.instance_by_id(context_id).unwrap(),
            page_type: page_type.into(),
            layout: layout.into(),
            subpage: subpage.into(),
        }
    }

    fn addable_names(services: &SiteServices, user: UserId, page: &PageContext) -> Vec<String> {
        let mut blocks = PageBlocks::new(page, services.blocks.as_ref());
        blocks.load_blocks(true);
        blocks.create_all_block_instances();
        services
            .eligibility
            .addable_blocks(user, &blocks)
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect()
    }

    #[test]
    fn sorted_by_title_and_filtered_by_format() {
        let s = services();
        let p = page(&s, 15, "course", "course", "");
        assert_eq!(addable_names(&s, 5, &p), vec!["calendar_month", "tags", "html"]);
    }

    #[test]
    fn blocks_on_the_page_are_excluded() {
        let s = services();
        let p = page(&s, 15, "course-view-topics", "course", "");
        let names = addable_names(&s, 5, &p);
        assert_eq!(names, vec!["section_links", "tags", "html"]);
        assert!(!names.contains(&"calendar_month".to_string()));
    }

    #[test]
    fn subpage_instances_only_count_on_their_subpage() {
        let s = services();
        let p = page(&s, 15, "course", "course", "7");
        assert!(!addable_names(&s, 5, &p).contains(&"tags".to_string()));
    }

    #[test]
    fn layout_without_regions_yields_nothing() {
        let s = services();
        let p = page(&s, 15, "course", "embedded", "");
        assert!(addable_names(&s, 5, &p).is_empty());
    }

    #[test]
    fn users_without_manageblocks_get_nothing() {
        let s = services();
        let p = page(&s, 15, "course", "course", "");
        assert!(addable_names(&s, 6, &p).is_empty());
    }

    #[test]
    fn prohibited_add_capability_removes_block() {
        let s = services();
        let p = page(&s, 15, "course", "course", "");
        assert_eq!(addable_names(&s, 8, &p), vec!["calendar_month", "html"]);
    }

    #[test]
    fn title_order_ignores_case() {
        let mut snapshot = SiteSnapshot::from_json(SAMPLE_SITE).unwrap();
        snapshot.strings.get_mut("en").unwrap().get_mut("block_calendar_month").unwrap()
            .insert("pluginname".into(), "Zebra calendar".into());
        snapshot.strings.get_mut("en").unwrap().get_mut("block_html").unwrap()
            .insert("pluginname".into(), "apple".into());
        let s = SiteServices::from_snapshot(snapshot, "en");
        let p = page(&s, 15, "course", "course", "");
        assert_eq!(addable_names(&s, 5, &p), vec!["html", "tags", "calendar_month"]);
    }

    #[test]
    fn format_restricted_blocks_follow_page_type() {
        let s = services();
        let p = page(&s, 30, "mod-quiz-view", "incourse", "");
        assert!(addable_names(&s, 5, &p).contains(&"quiz_results".to_string()));
        assert!(!addable_names(&s, 5, &p).contains(&"section_links".to_string()));
    }
}
