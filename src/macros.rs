/// Builds a [`Value`](crate::Value) from a literal-like syntax.
///
/// - `[a, b, ...]` builds an array
/// - `{k: v, ...}` builds a mapping with one value per key
/// - anything else goes through `Value::from`
///
/// Elements are token trees, so negative numbers and other compound
/// expressions need parentheses: `lpc!([(-1), (x + 1)])`.
///
/// ```rust
/// use serde_lpc::{lpc, Value};
///
/// let value = lpc!({ "hp": 10, "bag": ["rope", 2.5] });
/// let bag = value.as_mapping().and_then(|m| m.get_first(&Value::from("bag")));
/// assert_eq!(bag, Some(&lpc!(["rope", 2.5])));
/// ```
#[macro_export]
macro_rules! lpc {
    ([]) => {
        $crate::Value::Array(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::lpc!($elem)),*])
    };

    ({}) => {
        $crate::Value::Mapping($crate::Mapping::new())
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {{
        let mut mapping = $crate::Mapping::new();
        $(
            mapping.insert($crate::lpc!($key), vec![$crate::lpc!($value)]);
        )*
        $crate::Value::Mapping(mapping)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Mapping, Number, Value};

    #[test]
    fn test_lpc_macro_scalars() {
        assert_eq!(lpc!(42), Value::Number(Number::Integer(42)));
        assert_eq!(lpc!(3.5), Value::Number(Number::Float(3.5)));
        assert_eq!(lpc!((-7)), Value::Number(Number::Integer(-7)));
        assert_eq!(lpc!("hello"), Value::String("hello".to_string()));
        assert_eq!(lpc!(true), Value::from(1));
    }

    #[test]
    fn test_lpc_macro_arrays() {
        assert_eq!(lpc!([]), Value::Array(vec![]));
        assert_eq!(
            lpc!([1, [2, "x"],]),
            Value::Array(vec![
                Value::from(1),
                Value::Array(vec![Value::from(2), Value::from("x")]),
            ])
        );
    }

    #[test]
    fn test_lpc_macro_mappings() {
        assert_eq!(lpc!({}), Value::Mapping(Mapping::new()));

        let value = lpc!({ "name": "bob", 7: [1], "name": "alice" });
        let mapping = value.as_mapping().unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get_first(&Value::from("name")), Some(&Value::from("alice")));
        assert_eq!(
            mapping.get(&Value::from(7)),
            Some(&[Value::Array(vec![Value::from(1)])][..])
        );
    }
}
