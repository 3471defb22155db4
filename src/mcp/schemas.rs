use rust_mcp_schema::ToolInputSchema;
use serde_json::{json, Value};
use std::collections::HashMap;

// Helper to create a JSON schema property
fn create_prop(type_str: &str, description: &str) -> Value {
    json!({
        "type": type_str,
        "description": description
    })
}

fn create_pattern_prop(description: &str, pattern: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
        "pattern": pattern
    })
}

fn create_pattern_prop_with_default(description: &str, pattern: &str, default_val: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
        "pattern": pattern,
        "default": default_val
    })
}

const ALPHANUMEXT_PATTERN: &str = "^[a-zA-Z0-9_-]*$";
const ALPHA_PATTERN: &str = "^[a-zA-Z]*$";

pub fn get_config_schema() -> ToolInputSchema {
    ToolInputSchema::new(vec![], None)
}

pub fn fetch_addable_blocks_schema() -> ToolInputSchema {
    let mut properties = HashMap::new();
    properties.insert("pagecontextid".to_string(), create_prop("integer", "The context ID of the page."));
    properties.insert("pagetype".to_string(), create_pattern_prop("The type of the page.", ALPHANUMEXT_PATTERN));
    properties.insert("pagelayout".to_string(), create_pattern_prop("The layout of the page.", ALPHA_PATTERN));
    properties.insert("subpage".to_string(), json!({
        "type": "string",
        "description": "The subpage identifier",
        "default": ""
    }));
    properties.insert(
        "pagehash".to_string(),
        create_pattern_prop_with_default(
            "Page hash. When set, all other parameters are ignored and the page stored in the edit session is used.",
            ALPHANUMEXT_PATTERN,
            "",
        ),
    );
    ToolInputSchema::new(
        vec!["pagecontextid".to_string(), "pagetype".to_string(), "pagelayout".to_string()],
        Some(
            properties
                .into_iter()
                .map(|(k, v)| match v {
                    Value::Object(map) => (k, map),
                    other => unreachable!("property schema is not an object: {}", other),
                })
                .collect(),
        ),
    )
}

/// Shape of a successful `fetch_addable_blocks` result.
pub fn fetch_addable_blocks_returns() -> Value {
    json!({
        "type": "array",
        "description": "List of addable blocks in a given page.",
        "items": {
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "The name of the block." },
                "title": { "type": "string", "description": "The title of the block." },
                "blockform": {
                    "type": ["string", "null"],
                    "description": "If this block type has a form when it is being added then the classname of the form"
                }
            },
            "required": ["name", "title", "blockform"]
        }
    })
}

pub fn fetch_addable_blocks_description() -> String {
    format!(
        "Fetch the blocks that can still be added to a page. Returns: {}",
        fetch_addable_blocks_returns()
    )
}
