#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use rowgraph::model::{Cardinality, EntityStructure, FieldType, Relation, ValueConversion};
    use rowgraph::structure::SchemaRegistry;
    use rowgraph::{HydrateError, HydrationPlan};

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                EntityStructure::builder("Customer")
                    .key_field("id", FieldType::Integer)
                    .field("name", FieldType::String)
                    .relation("order", Relation::new(Cardinality::OneToOne, "Order"))
                    .build(),
            )
            .with(
                EntityStructure::builder("Order")
                    .field("total", FieldType::Float)
                    .field("paid", FieldType::Bool)
                    .build(),
            )
    }

    #[test]
    fn test_one_instruction_per_column() {
        let plan = HydrationPlan::builder("Customer")
            .columns(["id", "name", "order.total"])
            .build(&schema())
            .unwrap();

        assert_eq!(plan.root_entity_id(), "Customer");
        assert_eq!(plan.columns(), ["id", "name", "order.total"]);
        assert_eq!(plan.paths().len(), 2);
        assert_eq!(plan.instructions().len(), 3);

        let conversions: Vec<_> = plan.instructions().iter().map(|i| i.conversion).collect();
        assert_eq!(
            conversions,
            vec![ValueConversion::ToInt, ValueConversion::None, ValueConversion::ToFloat]
        );
    }

    #[test]
    fn test_instructions_snapshot() {
        let plan = HydrationPlan::builder("Customer")
            .columns(["order.paid", "id"])
            .build(&schema())
            .unwrap();

        let json = serde_json::to_string(plan.instructions()).unwrap();
        assert_snapshot!(json, @r#"[{"source_column":0,"column_key":"order.paid","slot":1,"field":"paid","conversion":"to_bool"},{"source_column":1,"column_key":"id","slot":0,"field":"id","conversion":"to_int"}]"#);
    }

    #[test]
    fn test_unknown_relation_fails_at_build() {
        let err = HydrationPlan::builder("Customer")
            .columns(["id", "invoice.number"])
            .build(&schema())
            .unwrap_err();

        assert!(err.is_structural());
        assert!(matches!(err, HydrateError::UnknownRelation { ref relation, .. } if relation == "invoice"));
    }

    #[test]
    fn test_unknown_field_fails_at_build() {
        let err = HydrationPlan::builder("Customer")
            .column("order.number")
            .build(&schema())
            .unwrap_err();

        match err {
            HydrateError::UnknownField { entity, field } => {
                assert_eq!(entity, "Order");
                assert_eq!(field, "number");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_root() {
        let err = HydrationPlan::builder("Invoice").column("id").build(&schema()).unwrap_err();
        assert!(matches!(err, HydrateError::UnknownEntity(_)));
    }

    #[test]
    fn test_plan_is_reusable() {
        let plan = HydrationPlan::builder("Customer")
            .columns(["id", "order.total"])
            .build(&schema())
            .unwrap();
        let copy = plan.clone();
        assert_eq!(plan.instructions(), copy.instructions());
        assert_eq!(plan.paths(), copy.paths());
    }
}
