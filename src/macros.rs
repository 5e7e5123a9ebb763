/// Builds a [`Value`](crate::Value) from a literal tree.
///
/// Scalars are text, so leaves are string literals (or any expression
/// with a `From` conversion into `Value`); `?` is the none value,
/// brackets build vectors and braces with literal keys build tables.
///
/// ```rust
/// use canopy::canopy;
///
/// let config = canopy!({
///     "host": "db1",
///     "ports": ["5432", "5433"],
///     "fallback": ?
/// });
/// assert_eq!(config.xget("ports[1]").and_then(|v| v.as_str()), Some("5433"));
/// ```
///
/// Keys are checked against the key grammar at runtime; an invalid key
/// literal panics.
#[macro_export]
macro_rules! canopy {
    // the none value
    (?) => {
        $crate::Value::None
    };

    // Handle empty vector
    ([]) => {
        $crate::Value::Vector(::std::vec::Vec::new())
    };

    // Handle non-empty vector
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Vector(::std::vec![$($crate::canopy!($elem)),*])
    };

    // Handle empty table
    ({}) => {
        $crate::Value::Table($crate::Table::new())
    };

    // Handle non-empty table
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::new();
        $(
            table.insert(
                $crate::Key::new($key).expect("invalid key literal"),
                $crate::canopy!($value),
            );
        )*
        $crate::Value::Table(table)
    }};

    // Fallback for any expression convertible into a Value
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Table, Value};

    #[test]
    fn macro_primitives() {
        assert_eq!(canopy!(?), Value::None);
        assert_eq!(canopy!("hello"), Value::from("hello"));
        assert_eq!(canopy!([]), Value::Vector(vec![]));
        assert_eq!(canopy!({}), Value::Table(Table::new()));
    }

    #[test]
    fn macro_vectors_nest() {
        let v = canopy!(["a", ["b", "c"], ?]);
        assert_eq!(v.xget("[1][1]").and_then(|x| x.as_str()), Some("c"));
        assert_eq!(v.get(2), Some(&Value::None));
    }

    #[test]
    fn macro_tables() {
        let v = canopy!({
            "name": "alice",
            "tags": ["admin", "ops"],
            "extra": {}
        });
        assert_eq!(v.xget("name").and_then(|x| x.as_str()), Some("alice"));
        assert_eq!(v.xget("tags[0]").and_then(|x| x.as_str()), Some("admin"));
        assert!(v.xget("extra").is_some_and(Value::is_table));
    }

    #[test]
    fn macro_matches_parsed_equivalent() {
        let built = canopy!({ "a": "1", "v": ["x", "y"] });
        let parsed = crate::parse("{a=\"1\" v=[\"x\" \"y\"]}").unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    #[should_panic(expected = "invalid key literal")]
    fn macro_rejects_bad_keys() {
        let _ = canopy!({ "9lives": "no" });
    }
}
