/// Native column type to GraphQL type mapping
///
/// Every native type maps onto one of the built-in scalars or the custom
/// `Long` scalar. Types with no natural scalar follow the configured
/// `ScalarPolicy`.

use crate::catalog::{ColumnDescriptor, NativeType, TableDescriptor};
use crate::config::ScalarPolicy;
use crate::error::{Result, TablegraphError};
use crate::schema::scalars::LONG;

use async_graphql::dynamic::TypeRef;

/// Natural scalar for a native type
///
/// # Type Mapping Rules
///
/// - boolean → `Boolean`
/// - bigint, decimal → `Long`
/// - double, real → `Float`
/// - smallint, integer, tinyint → `Int`
/// - date, time, timestamp, char, varchar, longvarchar → `String`
/// - guid → `ID`
///
/// Binary types, `null`, `other` and unrecognized names have no natural scalar
/// and return `None`.
pub fn scalar_for(native: &NativeType) -> Option<&'static str> {
    match native {
        NativeType::Boolean => Some(TypeRef::BOOLEAN),
        NativeType::BigInt | NativeType::Decimal => Some(LONG),
        NativeType::Double | NativeType::Real => Some(TypeRef::FLOAT),
        NativeType::SmallInt | NativeType::Integer | NativeType::TinyInt => Some(TypeRef::INT),
        NativeType::Date | NativeType::Time | NativeType::Timestamp => Some(TypeRef::STRING),
        NativeType::Char | NativeType::VarChar | NativeType::LongVarChar => {
            Some(TypeRef::STRING)
        }
        NativeType::Guid => Some(TypeRef::ID),
        NativeType::Binary
        | NativeType::VarBinary
        | NativeType::LongVarBinary
        | NativeType::Null
        | NativeType::Other
        | NativeType::Unrecognized(_) => None,
    }
}

/// Scalar for a column, applying the policy to types without a natural scalar
pub fn column_scalar(
    table: &TableDescriptor,
    column: &ColumnDescriptor,
    policy: ScalarPolicy,
) -> Result<&'static str> {
    match (scalar_for(&column.native_type), policy) {
        (Some(scalar), _) => Ok(scalar),
        (None, ScalarPolicy::Fallback) => {
            tracing::warn!(
                "Column '{}.{}' has type '{}' with no GraphQL scalar, exposing it as String",
                table.name,
                column.name,
                column.native_type
            );
            Ok(TypeRef::STRING)
        }
        (None, ScalarPolicy::Strict) => Err(TablegraphError::UnsupportedScalar {
            table: table.name.clone(),
            column: column.name.clone(),
            native: column.native_type.to_string(),
        }),
    }
}

/// Field type for a column's plain value: its scalar, non-null when required
pub fn column_type(
    table: &TableDescriptor,
    column: &ColumnDescriptor,
    policy: ScalarPolicy,
) -> Result<TypeRef> {
    let scalar = column_scalar(table, column, policy)?;
    Ok(if column.required {
        TypeRef::named_nn(scalar)
    } else {
        TypeRef::named(scalar)
    })
}
