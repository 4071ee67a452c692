/// Custom GraphQL scalars registered with every schema

use async_graphql::dynamic::Scalar;
use async_graphql::Value;

/// 64-bit integer scalar
pub const LONG: &str = "Long";

/// Create the Long scalar
///
/// Accepts integral numbers and strings holding a 64-bit integer; `Int` is
/// limited to 32 bits, which bigint and decimal keys routinely exceed.
pub fn long_scalar() -> Scalar {
    Scalar::new(LONG)
        .description("64-bit integer, accepted as a number or an integer string")
        .validator(is_long)
}

fn is_long(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_accepts_integers() {
        assert!(is_long(&Value::Number(i64::MAX.into())));
        assert!(is_long(&Value::Number((-5).into())));
        assert!(is_long(&Value::String("9007199254740993".to_string())));
    }

    #[test]
    fn test_long_rejects_other_values() {
        assert!(!is_long(&Value::String("twelve".to_string())));
        assert!(!is_long(&Value::Boolean(true)));
        assert!(!is_long(&Value::Null));

        let fraction = serde_json::Number::from_f64(1.5).unwrap();
        assert!(!is_long(&Value::Number(fraction)));
    }
}
