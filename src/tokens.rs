//! Placeholder tokens substituted into template names and contents.
//!
//! A placeholder is written `@NAME@`. Names missing from the map are left
//! untouched so templates can carry literal `@` text.
use std::collections::BTreeMap;

pub const IDE_OBJDIR: &str = "IDE_OBJDIR";
pub const IDE_TOPOBJDIR: &str = "IDE_TOPOBJDIR";
pub const IDE_SRCDIR: &str = "IDE_SRCDIR";
pub const IDE_TOPSRCDIR: &str = "IDE_TOPSRCDIR";
pub const IDE_PROJECT_NAME: &str = "IDE_PROJECT_NAME";
pub const IDE_PACKAGE_NAME: &str = "IDE_PACKAGE_NAME";
pub const IDE_PROJECT_DIRECTORY: &str = "IDE_PROJECT_DIRECTORY";
pub const IDE_RELSRCDIR: &str = "IDE_RELSRCDIR";
pub const IDE_CLASSPATH_ENTRIES: &str = "IDE_CLASSPATH_ENTRIES";
pub const IDE_RECURSIVE_MAKE_TARGETS: &str = "IDE_RECURSIVE_MAKE_TARGETS";
pub const IDE_PROJECT_LIBRARY_SETTING: &str = "IDE_PROJECT_LIBRARY_SETTING";
pub const IDE_PROJECT_LIBRARY_REFERENCES: &str = "IDE_PROJECT_LIBRARY_REFERENCES";
pub const ANDROID_TARGET_SDK: &str = "ANDROID_TARGET_SDK";
pub const IDE_PROJECT_FILTERED_RESOURCES: &str = "IDE_PROJECT_FILTERED_RESOURCES";
pub const IDE_PLUGIN: &str = "IDE_PLUGIN";
pub const IDE_DEPENDENCIES: &str = "IDE_DEPENDENCIES";
pub const IDE_ORDERENTRY_MODULES: &str = "IDE_ORDERENTRY_MODULES";
pub const IDE_ORDERENTRY_MODULE_LIBRARIES: &str = "IDE_ORDERENTRY_MODULE_LIBRARIES";
pub const IDE_SRCDIRS: &str = "IDE_SRCDIRS";
pub const IDE_EXCLUDES: &str = "IDE_EXCLUDES";
pub const IDE_SOURCEFOLDERS: &str = "IDE_SOURCEFOLDERS";

/// Mapping from placeholder name to its substitution value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    values: BTreeMap<String, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Replace every known `@NAME@` in `text`.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('@') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match placeholder_len(after).and_then(|len| {
                self.get(&after[..len]).map(|value| (len, value))
            }) {
                Some((len, value)) => {
                    out.push_str(value);
                    rest = &after[len + 1..];
                }
                None => {
                    out.push('@');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Length of a well-formed placeholder name at the start of `text`, which
/// must be followed by a closing `@`.
fn placeholder_len(text: &str) -> Option<usize> {
    let len = text
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_'))
        .map(|(idx, _)| idx)?;
    let starts_ok = text
        .chars()
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    (len > 0 && starts_ok && text[len..].starts_with('@')).then_some(len)
}
