use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Class used by blocks that do not ship their own edit form.
pub const GENERIC_EDIT_FORM: &str = "block_edit_form";

/// Edit form declaration as written in a block type definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditFormSpec {
    #[serde(default)]
    pub display_when_adding: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub class_name: String,
    pub display_when_adding: bool,
}

impl EditForm {
    pub fn generic() -> Self {
        Self {
            class_name: GENERIC_EDIT_FORM.to_string(),
            display_when_adding: false,
        }
    }
}

pub trait BlockFormRegistry: Send + Sync {
    /// Form class for `block_name`; blocks without their own form get the
    /// generic one.
    fn edit_form(&self, block_name: &str) -> EditForm;
}

/// Name -> form mapping populated once at startup.
#[derive(Debug, Default)]
pub struct EditFormRegistry {
    forms: HashMap<String, EditForm>,
}

impl EditFormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, block_name: &str, spec: &EditFormSpec) {
        self.forms.insert(
            block_name.to_string(),
            EditForm {
                class_name: format!("block_{}_edit_form", block_name),
                display_when_adding: spec.display_when_adding,
            },
        );
    }
}

impl BlockFormRegistry for EditFormRegistry {
    fn edit_form(&self, block_name: &str) -> EditForm {
        self.forms.get(block_name).cloned().unwrap_or_else(EditForm::generic)
    }
}
