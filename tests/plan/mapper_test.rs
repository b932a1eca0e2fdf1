#[cfg(test)]
mod tests {
    use rowgraph::mapper::{local_name, parent_path, AliasedFieldMapper, DottedFieldMapper, FieldMapper, ROOT_PATH};

    fn map(mapper: &dyn FieldMapper, key: &str) -> (String, String) {
        mapper.map(key)
    }

    #[test]
    fn test_root_columns() {
        assert_eq!(map(&DottedFieldMapper, "id"), (".".to_string(), "id".to_string()));
        assert_eq!(map(&DottedFieldMapper, "name"), (ROOT_PATH.to_string(), "name".to_string()));
    }

    #[test]
    fn test_splits_at_last_dot() {
        assert_eq!(
            map(&DottedFieldMapper, "order.customer.name"),
            ("order.customer".to_string(), "name".to_string())
        );
        assert_eq!(map(&DottedFieldMapper, "order.total"), ("order".to_string(), "total".to_string()));
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(map(&DottedFieldMapper, ""), (".".to_string(), String::new()));
    }

    #[test]
    fn test_aliased_root() {
        let mapper = AliasedFieldMapper::new("order");
        assert_eq!(map(&mapper, "order.id"), (".".to_string(), "id".to_string()));
        assert_eq!(
            map(&mapper, "order.customer.name"),
            ("customer".to_string(), "name".to_string())
        );
        // not prefixed with the alias
        assert_eq!(map(&mapper, "orders.id"), ("orders".to_string(), "id".to_string()));
        assert_eq!(map(&mapper, "total"), (".".to_string(), "total".to_string()));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(parent_path("a.b.c"), "a.b");
        assert_eq!(parent_path("a"), ".");
        assert_eq!(local_name("a.b.c"), "c");
        assert_eq!(local_name("a"), "a");
    }
}
