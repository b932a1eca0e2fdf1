//! Column key -> (relation path, field name) mapping.
//!
//! ```text
//! "id"                   -> (".",              "id")
//! "order.total"          -> ("order",          "total")
//! "order.customer.name"  -> ("order.customer", "name")
//! ```

/// Path of the hydration root.
pub const ROOT_PATH: &str = ".";

/// Splits a source column key into a relation path and a field name.
pub trait FieldMapper {
    fn map(&self, column_key: &str) -> (String, String);
}

/// Splits at the last `.`; keys without a dot belong to the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedFieldMapper;

impl FieldMapper for DottedFieldMapper {
    fn map(&self, column_key: &str) -> (String, String) {
        match column_key.rfind('.') {
            Some(pos) => {
                let path = &column_key[..pos];
                let path = if path.is_empty() { ROOT_PATH } else { path };
                (path.to_string(), column_key[pos + 1..].to_string())
            }
            None => (ROOT_PATH.to_string(), column_key.to_string()),
        }
    }
}

/// Columns prefixed with the root's alias, e.g. `order.id`,
/// `order.customer.name` when hydrating orders.
///
/// Keys not starting with the alias are mapped as by [`DottedFieldMapper`].
#[derive(Debug, Clone)]
pub struct AliasedFieldMapper {
    alias: String,
}

impl AliasedFieldMapper {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }
}

impl FieldMapper for AliasedFieldMapper {
    fn map(&self, column_key: &str) -> (String, String) {
        let stripped = column_key
            .strip_prefix(self.alias.as_str())
            .and_then(|rest| rest.strip_prefix('.'));
        DottedFieldMapper.map(stripped.unwrap_or(column_key))
    }
}

/// Parent of a non-root path: `"a.b.c"` -> `"a.b"`, `"a"` -> `"."`.
pub fn parent_path(path: &str) -> &str {
    match path.rfind('.') {
        Some(pos) if pos > 0 => &path[..pos],
        _ => ROOT_PATH,
    }
}

/// Last segment of a path, i.e. the relation name on the parent.
pub fn local_name(path: &str) -> &str {
    match path.rfind('.') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}
