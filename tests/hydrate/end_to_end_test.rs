#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use rowgraph::prelude::*;

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                EntityStructure::builder("Customer")
                    .key_field("id", FieldType::Integer)
                    .field("name", FieldType::String)
                    .relation("order", Relation::new(Cardinality::OneToOne, "Order"))
                    .build(),
            )
            .with(EntityStructure::builder("Order").field("total", FieldType::Float).build())
    }

    fn rows() -> Vec<Row> {
        [["1", "Alice", "10.5"], ["2", "Bob", "20.0"]]
            .into_iter()
            .map(|row| row.into_iter().map(Value::from).collect())
            .collect()
    }

    fn hydrate_all(plan: HydrationPlan, rows: Vec<Row>) -> Vec<Box<dyn Instance>> {
        HydrationCursor::new(plan, RecordActivator, VecRowSource::new(rows), HydrationOptions::default())
            .unwrap()
            .into_entities()
            .collect::<HydrateResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_customers_with_orders() {
        let plan = HydrationPlan::builder("Customer")
            .columns(["id", "name", "order.total"])
            .build(&schema())
            .unwrap();
        let roots = hydrate_all(plan, rows());

        assert_eq!(roots.len(), 2);
        let json: Vec<String> = roots.iter().map(|root| root.to_json().to_string()).collect();
        assert_snapshot!(json.join("\n"), @r#"
        {"id":1,"name":"Alice","order":{"total":10.5}}
        {"id":2,"name":"Bob","order":{"total":20.0}}
        "#);

        let alice = roots[0].as_any().downcast_ref::<Record>().unwrap();
        assert_eq!(alice.get("id"), Some(&Value::Int(1)));
        assert_eq!(alice.get("name"), Some(&Value::from("Alice")));
        assert_eq!(alice.one("order").unwrap().get("total"), Some(&Value::Float(10.5)));
    }

    #[test]
    fn test_root_only_rows_are_independent() {
        let plan = HydrationPlan::builder("Customer")
            .columns(["id", "name"])
            .build(&schema())
            .unwrap();
        let rows: Vec<Row> = (0..5).map(|i| vec![Value::Int(i), Value::from("x")]).collect();
        let mut roots: Vec<Box<Record>> = hydrate_all(plan, rows)
            .into_iter()
            .map(|root| downcast::<Record>(root).unwrap())
            .collect();

        assert_eq!(roots.len(), 5);
        roots[0].set_field("name", Value::from("changed")).unwrap();
        for root in &roots[1..] {
            assert_eq!(root.get("name"), Some(&Value::from("x")));
        }
        let ids: Vec<i64> = roots.iter().map(|r| r.get("id").unwrap().as_i64().unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_hydration_is_deterministic() {
        let build = || {
            HydrationPlan::builder("Customer")
                .columns(["order.total", "id", "name"])
                .build(&schema())
                .unwrap()
        };
        assert_eq!(build().paths(), build().paths());

        let first: Vec<_> = hydrate_all(build(), rows()).iter().map(|r| r.to_json()).collect();
        let second: Vec<_> = hydrate_all(build(), rows()).iter().map(|r| r.to_json()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_column_values() {
        let plan = HydrationPlan::builder("Customer")
            .columns(["id", "name", "order.total"])
            .build(&schema())
            .unwrap();
        let row: Row = serde_json::from_str(r#"[3, null, 7.25]"#).unwrap();
        let roots = hydrate_all(plan, vec![row]);

        assert_eq!(
            roots[0].to_json(),
            serde_json::json!({ "id": 3, "name": null, "order": { "total": 7.25 } })
        );
    }
}
