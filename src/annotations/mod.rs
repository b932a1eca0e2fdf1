//! Doc-comment annotations.
//!
//! Entity declarations carry metadata as `@name value` tags in their doc
//! comments. Tags may be namespaced (`@minor:relation ...`); un-namespaced
//! tags live in the global namespace.
//!
//! ```text
//! /// @minor:key
//! /// @var int
//! id
//! ```
//!
//! Lookups are namespaced with alias and global fallback:
//!
//! 1. `ns:name`
//! 2. `alias:name` for every alias registered for `ns`
//! 3. `name` (global), unless `ns` is strict

mod registry;

pub use registry::{AnnotationRegistry, EntityDeclaration, PropertyDeclaration};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Namespace of un-prefixed tags.
pub const GLOBAL_NAMESPACE: &str = ":global";

/// `@name value` up to end of line.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([^\s@]+)[ \t]*([^\r\n]*)").expect("tag pattern"));

/// Value of one annotation occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationValue {
    /// Tag present without a value, e.g. `@key`.
    Flag,
    Text(String),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Flag => None,
            AnnotationValue::Text(s) => Some(s),
        }
    }

    /// Flags and any text other than `0`/`false` count as set.
    pub fn is_truthy(&self) -> bool {
        match self {
            AnnotationValue::Flag => true,
            AnnotationValue::Text(s) => !(s == "0" || s.eq_ignore_ascii_case("false")),
        }
    }
}

/// Parse every `@tag value` occurrence of a doc comment.
///
/// Repeated tags accumulate in declaration order.
pub fn parse_doc_comment(doc: &str) -> HashMap<String, Vec<AnnotationValue>> {
    let mut tags: HashMap<String, Vec<AnnotationValue>> = HashMap::new();

    for caps in TAG_PATTERN.captures_iter(doc) {
        let name = caps[1].to_string();
        let raw = caps[2].trim();
        let raw = raw.strip_suffix("*/").unwrap_or(raw).trim();

        let value = if raw.is_empty() {
            AnnotationValue::Flag
        } else {
            AnnotationValue::Text(raw.to_string())
        };
        tags.entry(name).or_default().push(value);
    }

    tags
}

/// Namespace aliasing and strictness rules shared by all lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespaces {
    /// alias -> canonical namespace
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Namespaces that never fall back to global tags.
    #[serde(default)]
    pub strict: BTreeSet<String>,
}

impl Namespaces {
    pub fn with_alias(mut self, alias: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), namespace.into());
        self
    }

    pub fn with_strict(mut self, namespace: impl Into<String>) -> Self {
        self.strict.insert(namespace.into());
        self
    }

    /// Tag names to try, in order, for `namespace`/`name`.
    fn candidates(&self, namespace: &str, name: &str) -> Vec<String> {
        if namespace == GLOBAL_NAMESPACE {
            return vec![name.to_string()];
        }

        let mut out = vec![format!("{}:{}", namespace, name)];
        out.extend(
            self.aliases
                .iter()
                .filter(|(_, target)| target.as_str() == namespace)
                .map(|(alias, _)| format!("{}:{}", alias, name)),
        );
        if !self.strict.contains(namespace) {
            out.push(name.to_string());
        }
        out
    }
}

/// Namespaced key-value metadata of one declared member.
pub trait AnnotationStore {
    fn get_values(&self, namespace: &str, name: &str) -> &[AnnotationValue];

    fn get_value(&self, namespace: &str, name: &str) -> Option<&AnnotationValue> {
        self.get_values(namespace, name).first()
    }

    fn has_annotation(&self, namespace: &str, name: &str) -> bool {
        !self.get_values(namespace, name).is_empty()
    }

    /// Text of the first value, ignoring flags.
    fn get_text(&self, namespace: &str, name: &str) -> Option<&str> {
        self.get_value(namespace, name).and_then(AnnotationValue::as_str)
    }
}

/// Parsed annotations of a class or property doc comment.
#[derive(Debug, Clone)]
pub struct MemberAnnotations {
    tags: HashMap<String, Vec<AnnotationValue>>,
    namespaces: Arc<Namespaces>,
}

impl MemberAnnotations {
    pub fn parse(doc: &str, namespaces: Arc<Namespaces>) -> Self {
        Self {
            tags: parse_doc_comment(doc),
            namespaces,
        }
    }

    /// All tags, keyed by their raw (possibly namespaced) name.
    pub fn all(&self) -> &HashMap<String, Vec<AnnotationValue>> {
        &self.tags
    }
}

impl AnnotationStore for MemberAnnotations {
    fn get_values(&self, namespace: &str, name: &str) -> &[AnnotationValue] {
        self.namespaces
            .candidates(namespace, name)
            .iter()
            .find_map(|tag| self.tags.get(tag).filter(|v| !v.is_empty()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
