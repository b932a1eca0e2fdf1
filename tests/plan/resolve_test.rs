#[cfg(test)]
mod tests {
    use rowgraph::model::{Cardinality, EntityStructure, FieldType, Relation};
    use rowgraph::resolve::{resolve, PathResolver, ROOT_SLOT};
    use rowgraph::structure::SchemaRegistry;
    use rowgraph::HydrateError;

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                EntityStructure::builder("shop::Order")
                    .key_field("id", FieldType::Integer)
                    .relation("customer", Relation::new(Cardinality::ManyToOne, "shop::Customer"))
                    .relation("lines", Relation::new(Cardinality::OneToMany, "shop::Line"))
                    .build(),
            )
            .with(
                EntityStructure::builder("shop::Customer")
                    .key_field("id", FieldType::Integer)
                    .relation("address", Relation::new(Cardinality::OneToOne, "shop::Address"))
                    .build(),
            )
            .with(EntityStructure::builder("shop::Address").field("city", FieldType::String).build())
            .with(EntityStructure::builder("shop::Line").field("sku", FieldType::String).build())
    }

    #[test]
    fn test_root_is_slot_zero() {
        let schema = schema();
        let paths = resolve(Vec::<&str>::new(), "shop::Order", &schema).unwrap();

        assert_eq!(paths.len(), 1);
        let root = paths.root();
        assert_eq!(root.path, ".");
        assert_eq!(root.slot, ROOT_SLOT);
        assert_eq!(root.entity_id, "shop::Order");
        assert!(root.parent_slot.is_none());
    }

    #[test]
    fn test_deep_path_resolves_ancestors() {
        let schema = schema();
        let paths = resolve(["customer.address", "lines"], "shop::Order", &schema).unwrap();

        let customer = paths.get("customer").unwrap();
        let address = paths.get("customer.address").unwrap();
        let lines = paths.get("lines").unwrap();

        assert_eq!(customer.slot, 1);
        assert_eq!(address.slot, 2);
        assert_eq!(lines.slot, 3);
        assert_eq!(address.parent_slot, Some(customer.slot));
        assert_eq!(lines.cardinality, Some(Cardinality::OneToMany));
        assert_eq!(customer.cardinality, Some(Cardinality::ManyToOne));
    }

    #[test]
    fn test_same_paths_resolve_to_same_slots() {
        let schema = schema();
        let required = ["lines", "customer.address", "customer"];

        let first = resolve(required, "shop::Order", &schema).unwrap();
        let second = resolve(required, "shop::Order", &schema).unwrap();
        assert_eq!(first, second);

        let mut resolver = PathResolver::new(&schema, "shop::Order").unwrap();
        let slot = resolver.resolve_path("customer.address").unwrap();
        assert_eq!(resolver.resolve_path("customer.address").unwrap(), slot);
        assert_eq!(resolver.finish().len(), 3);
    }

    #[test]
    fn test_unknown_relation() {
        let schema = schema();
        let err = resolve(["customer.invoice"], "shop::Order", &schema).unwrap_err();

        match err {
            HydrateError::UnknownRelation { entity, relation, path } => {
                assert_eq!(entity, "shop::Customer");
                assert_eq!(relation, "invoice");
                assert_eq!(path, "customer.invoice");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_relation_target_must_be_known() {
        let schema = SchemaRegistry::new().with(
            EntityStructure::builder("Order")
                .relation("customer", Relation::new(Cardinality::ManyToOne, "Customer"))
                .build(),
        );
        // the target's own structure is only needed to go deeper
        assert!(resolve(["customer"], "Order", &schema).is_ok());
        let err = resolve(["customer.address"], "Order", &schema).unwrap_err();
        assert!(matches!(err, HydrateError::UnknownEntity(id) if id == "Customer"));
    }
}
