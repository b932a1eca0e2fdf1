#[cfg(test)]
mod tests {
    use rowgraph::config::SettingsError;
    use rowgraph::model::{Cardinality, FieldType};
    use rowgraph::structure::{EntityStructureProvider, SchemaRegistry};
    use rowgraph::HydrationPlan;

    const SCHEMA: &str = r#"
[[entity]]
id = "shop::Order"
key = ["id"]
fields = [
    { name = "id", type = "integer" },
    { name = "total", type = "float" },
    { name = "note" },
]

[entity.relations.customer]
target = "shop::Customer"
cardinality = "many_to_one"
owner_field = "customer_id"
target_field = "id"

[entity.relations.lines]
target = "shop::Line"
cardinality = "one_to_many"

[[entity]]
id = "shop::Customer"
key = ["region", "number"]
fields = [
    { name = "region", type = "string" },
    { name = "number", type = "integer" },
    { name = "vip", type = "bool" },
]

[[entity]]
id = "shop::Line"
fields = [{ name = "sku" }]
"#;

    #[test]
    fn test_parse_schema() {
        let registry = SchemaRegistry::from_toml_str(SCHEMA).unwrap();
        assert_eq!(registry.len(), 3);

        let order = registry.entity_structure("shop::Order").unwrap();
        assert_eq!(order.field_type("total"), Some(FieldType::Float));
        assert_eq!(order.field_type("note"), Some(FieldType::String));
        assert_eq!(order.key_field_name(), Some("id"));

        let customer = order.relation("customer").unwrap();
        assert_eq!(customer.cardinality, Cardinality::ManyToOne);
        assert_eq!(customer.owner_field, "customer_id");

        let lines = order.relation("lines").unwrap();
        assert_eq!(lines.cardinality, Cardinality::OneToMany);
        assert!(lines.owner_field.is_empty());
    }

    #[test]
    fn test_composite_key() {
        let registry = SchemaRegistry::from_toml_str(SCHEMA).unwrap();
        let customer = registry.entity_structure("shop::Customer").unwrap();

        assert!(customer.has_composite_key());
        assert_eq!(customer.key_field_names(), ["region", "number"]);
        assert_eq!(customer.field_type("vip"), Some(FieldType::Bool));
    }

    #[test]
    fn test_plan_from_schema_file() {
        let registry = SchemaRegistry::from_toml_str(SCHEMA).unwrap();
        let plan = HydrationPlan::builder("shop::Order")
            .columns(["id", "customer.vip", "lines.sku"])
            .build(&registry)
            .unwrap();

        assert_eq!(plan.paths().len(), 3);
        assert_eq!(plan.paths().get("lines").unwrap().entity_id, "shop::Line");
    }

    #[test]
    fn test_invalid_schema() {
        let result = SchemaRegistry::from_toml_str("[[entity]]\nfields = []\n");
        assert!(matches!(result, Err(SettingsError::ParseError(_))));

        let result = SchemaRegistry::from_file("/nonexistent/schema.toml");
        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }
}
