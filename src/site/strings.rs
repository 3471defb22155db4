use std::collections::HashMap;

pub const FALLBACK_LANGUAGE: &str = "en";

/// language -> component -> identifier -> text
pub type StringTable = HashMap<String, HashMap<String, HashMap<String, String>>>;

pub trait StringManager: Send + Sync {
    fn get_string(&self, identifier: &str, component: &str) -> String;
}

/// Language pack lookup with a fallback to English. Missing strings render as
/// `[[identifier]]` so gaps stay visible instead of failing the request.
#[derive(Debug, Default)]
pub struct LanguagePack {
    language: String,
    strings: StringTable,
}

impl LanguagePack {
    pub fn new(language: impl Into<String>, strings: StringTable) -> Self {
        Self { language: language.into(), strings }
    }

    fn lookup(&self, language: &str, identifier: &str, component: &str) -> Option<&String> {
        self.strings.get(language)?.get(component)?.get(identifier)
    }
}

impl StringManager for LanguagePack {
    fn get_string(&self, identifier: &str, component: &str) -> String {
        self.lookup(&self.language, identifier, component)
            .or_else(|| self.lookup(FALLBACK_LANGUAGE, identifier, component))
            .cloned()
            .unwrap_or_else(|| format!("[[{}]]", identifier))
    }
}
