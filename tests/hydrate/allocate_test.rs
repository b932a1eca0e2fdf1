#[cfg(test)]
mod tests {
    use rowgraph::allocate::{ActivatorRegistry, EntityActivator, ObjectGraph, RecordActivator};
    use rowgraph::model::{
        downcast, Cardinality, EntityStructure, FieldType, Instance, InstanceError, Record, Relation, Value,
    };
    use rowgraph::resolve::resolve;
    use rowgraph::structure::SchemaRegistry;
    use rowgraph::{HydrateError, HydrateResult, HydrationPlan, Hydrator};
    use std::any::Any;

    fn schema() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                EntityStructure::builder("Order")
                    .key_field("id", FieldType::Integer)
                    .relation("customer", Relation::new(Cardinality::ManyToOne, "Customer"))
                    .relation("lines", Relation::new(Cardinality::OneToMany, "Line"))
                    .build(),
            )
            .with(EntityStructure::builder("Customer").field("name", FieldType::String).build())
            .with(EntityStructure::builder("Line").field("sku", FieldType::String).build())
    }

    #[derive(Debug, Default)]
    struct Customer {
        name: String,
    }

    impl Instance for Customer {
        fn entity_id(&self) -> &str {
            "Customer"
        }

        fn set_field(&mut self, name: &str, value: Value) -> Result<(), InstanceError> {
            match name {
                "name" => {
                    self.name = value.to_string();
                    Ok(())
                }
                other => Err(InstanceError::unknown_field("Customer", other)),
            }
        }

        fn attach(&mut self, relation: &str, _: Cardinality, _: Box<dyn Instance>) -> Result<(), InstanceError> {
            Err(InstanceError::unknown_relation("Customer", relation))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }

        fn to_json(&self) -> serde_json::Value {
            serde_json::json!({ "name": self.name })
        }
    }

    #[test]
    fn test_rows_share_no_instances() {
        let schema = schema();
        let paths = resolve(["customer"], "Order", &schema).unwrap();
        let graph = ObjectGraph::allocate(&paths, 3, &RecordActivator).unwrap();

        assert_eq!(graph.count(), 3);
        let a = graph.instance(1, 0).unwrap() as *const dyn Instance as *const u8;
        let b = graph.instance(1, 1).unwrap() as *const dyn Instance as *const u8;
        assert_ne!(a, b);
        assert!(graph.instance(2, 0).is_none());
        assert!(graph.instance(1, 3).is_none());
    }

    #[test]
    fn test_many_to_one_is_single_instance() {
        let plan = HydrationPlan::builder("Order")
            .columns(["id", "customer.name"])
            .build(&schema())
            .unwrap();
        let roots = Hydrator::new(plan)
            .hydrate(vec![vec![Value::from("7"), Value::from("Ada")]], &RecordActivator)
            .unwrap();

        let order = downcast::<Record>(roots.into_iter().next().unwrap()).unwrap();
        let customer = order.one("customer").expect("single customer");
        assert_eq!(customer.get("name"), Some(&Value::from("Ada")));
        assert!(order.many("customer").is_empty());
    }

    #[test]
    fn test_one_to_many_collects_child() {
        let plan = HydrationPlan::builder("Order")
            .columns(["id", "lines.sku"])
            .build(&schema())
            .unwrap();
        let roots = Hydrator::new(plan)
            .hydrate(vec![vec![Value::from("7"), Value::from("A-1")]], &RecordActivator)
            .unwrap();

        let order = downcast::<Record>(roots.into_iter().next().unwrap()).unwrap();
        assert!(order.one("lines").is_none());
        assert_eq!(order.many("lines").len(), 1);
        assert_eq!(order.many("lines")[0].get("sku"), Some(&Value::from("A-1")));
    }

    #[test]
    fn test_typed_children_into_records() {
        let activator = ActivatorRegistry::new()
            .register_default::<Customer>("Customer")
            .with_record_fallback();
        let plan = HydrationPlan::builder("Order")
            .columns(["id", "customer.name"])
            .build(&schema())
            .unwrap();

        // Record only accepts Record children
        let err = Hydrator::new(plan)
            .hydrate(vec![vec![Value::from("1"), Value::from("Ada")]], &activator)
            .unwrap_err();
        assert!(matches!(err, HydrateError::Instance(InstanceError::ChildType { .. })));
    }

    #[test]
    fn test_typed_root() {
        let activator = ActivatorRegistry::new().register_default::<Customer>("Customer");
        let plan = HydrationPlan::builder("Customer").column("name").build(&schema()).unwrap();

        let roots = Hydrator::new(plan)
            .hydrate(vec![vec![Value::from("Ada")], vec![Value::from("Grace")]], &activator)
            .unwrap();
        let names: Vec<String> = roots
            .into_iter()
            .map(|root| downcast::<Customer>(root).unwrap().name)
            .collect();
        assert_eq!(names, vec!["Ada", "Grace"]);
    }

    struct FailingActivator;

    impl EntityActivator for FailingActivator {
        fn create_instances(&self, entity_id: &str, count: usize) -> HydrateResult<Vec<Box<dyn Instance>>> {
            if entity_id == "Customer" {
                return Err(HydrateError::activator(entity_id, count, "constructor failed"));
            }
            RecordActivator.create_instances(entity_id, count)
        }
    }

    #[test]
    fn test_activator_failure_aborts_batch() {
        let plan = HydrationPlan::builder("Order")
            .columns(["id", "customer.name"])
            .build(&schema())
            .unwrap();
        let err = Hydrator::new(plan)
            .hydrate(vec![vec![Value::from("1"), Value::from("Ada")]], &FailingActivator)
            .unwrap_err();

        match err {
            HydrateError::ActivatorFailure { entity, count, .. } => {
                assert_eq!(entity, "Customer");
                assert_eq!(count, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
