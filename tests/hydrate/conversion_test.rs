#[cfg(test)]
mod tests {
    use rowgraph::allocate::RecordActivator;
    use rowgraph::model::{downcast, EntityStructure, FieldType, Record, Value, ValueConversion};
    use rowgraph::structure::SchemaRegistry;
    use rowgraph::{HydrationPlan, Hydrator};

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_int_conversion() {
        assert_eq!(ValueConversion::ToInt.apply(&text("42")), Value::Int(42));
        assert_eq!(ValueConversion::ToInt.apply(&text("-7")), Value::Int(-7));
        assert_eq!(ValueConversion::ToInt.apply(&text("12abc")), Value::Int(12));
        assert_eq!(ValueConversion::ToInt.apply(&text("3.9")), Value::Int(3));
    }

    #[test]
    fn test_float_conversion() {
        assert_eq!(ValueConversion::ToFloat.apply(&text("3.14")), Value::Float(3.14));
        assert_eq!(ValueConversion::ToFloat.apply(&text("20.0")), Value::Float(20.0));
        assert_eq!(ValueConversion::ToFloat.apply(&text("1e3")), Value::Float(1000.0));
        assert_eq!(ValueConversion::ToFloat.apply(&Value::Int(2)), Value::Float(2.0));
    }

    #[test]
    fn test_bool_conversion() {
        assert_eq!(ValueConversion::ToBool.apply(&text("0")), Value::Bool(false));
        assert_eq!(ValueConversion::ToBool.apply(&text("")), Value::Bool(false));
        assert_eq!(ValueConversion::ToBool.apply(&text("1")), Value::Bool(true));
        assert_eq!(ValueConversion::ToBool.apply(&text("false")), Value::Bool(true));
        assert_eq!(ValueConversion::ToBool.apply(&text("no")), Value::Bool(true));
        assert_eq!(ValueConversion::ToBool.apply(&Value::Null), Value::Bool(false));
    }

    #[test]
    fn test_none_passes_raw_value() {
        for raw in [text("42"), Value::Null, Value::Float(1.5), text("")] {
            assert_eq!(ValueConversion::None.apply(&raw), raw);
        }
    }

    /// Malformed numbers become zero instead of failing the row.
    #[test]
    fn test_malformed_numbers_coerce_to_zero() {
        assert_eq!(ValueConversion::ToInt.apply(&text("abc")), Value::Int(0));
        assert_eq!(ValueConversion::ToInt.apply(&text("")), Value::Int(0));
        assert_eq!(ValueConversion::ToFloat.apply(&text("n/a")), Value::Float(0.0));
        assert_eq!(ValueConversion::ToInt.apply(&Value::Null), Value::Int(0));
    }

    #[test]
    fn test_malformed_row_still_hydrates() {
        let schema = SchemaRegistry::new().with(
            EntityStructure::builder("Reading")
                .field("count", FieldType::Integer)
                .field("value", FieldType::Float)
                .field("valid", FieldType::Bool)
                .build(),
        );
        let plan = HydrationPlan::builder("Reading")
            .columns(["count", "value", "valid"])
            .build(&schema)
            .unwrap();

        let roots = Hydrator::new(plan)
            .hydrate(vec![vec![text("many"), text("?"), text("0")]], &RecordActivator)
            .unwrap();
        let reading = downcast::<Record>(roots.into_iter().next().unwrap()).unwrap();

        assert_eq!(reading.get("count"), Some(&Value::Int(0)));
        assert_eq!(reading.get("value"), Some(&Value::Float(0.0)));
        assert_eq!(reading.get("valid"), Some(&Value::Bool(false)));
    }
}
