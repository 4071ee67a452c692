/// The `Query` root: one field named after the table, looked up by primary key

use crate::catalog::TableDescriptor;
use crate::error::{Result, TablegraphError};
use crate::schema::fetch::Fetcher;
use crate::schema::object::ObjectTypeDef;
use crate::schema::resolver::FieldResolution;
use crate::schema::QUERY;
use crate::source::Selection;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext, TypeRef};
use async_graphql::Value;

/// Build the `Query` object for `table`
///
/// Each primary-key column becomes an argument typed like its field. Keys
/// that are not plain scalar columns are rejected.
pub fn build_root(table: &TableDescriptor, object_type: &ObjectTypeDef) -> Result<Object> {
    let mut arguments = Vec::with_capacity(table.primary_key.len());
    let mut keys = Vec::with_capacity(table.primary_key.len());

    for pk in &table.primary_key {
        let column = table.find_column(pk).ok_or_else(|| {
            TablegraphError::SchemaBuild(format!(
                "Primary key '{}' is not a column of {}",
                pk,
                table.table_ref()
            ))
        })?;

        let field = object_type.field(&column.name).ok_or_else(|| {
            TablegraphError::SchemaBuild(format!(
                "Primary key '{}' of {} is not exposed as a field",
                column.name,
                table.table_ref()
            ))
        })?;

        if field.resolution != FieldResolution::Passthrough || !is_input_scalar(&field.ty) {
            return Err(TablegraphError::SchemaBuild(format!(
                "Primary key '{}' of {} has type {} which cannot be used as an argument",
                column.name,
                table.table_ref(),
                field.ty
            )));
        }

        let mut argument = InputValue::new(column.name.clone(), field.ty.clone());
        if let Some(desc) = &column.description {
            argument = argument.description(desc);
        }
        arguments.push(argument);
        keys.push(column.name.clone());
    }

    let table_ref = table.table_ref();

    let mut field = Field::new(
        table.name.clone(),
        TypeRef::named(&object_type.name),
        move |ctx: ResolverContext| {
            let table_ref = table_ref.clone();
            let keys = keys.clone();

            FieldFuture::new(async move {
                let fetcher = ctx.data::<Fetcher>()?;

                let mut selection = Selection::new();
                for key in &keys {
                    let value = ctx
                        .args
                        .get(key)
                        .map(|v| v.as_value().clone())
                        .unwrap_or(Value::Null);
                    selection = selection.where_eq(key.as_str(), value);
                }

                let row = fetcher.fetch_one(&table_ref, selection).await?;
                Ok(row.map(FieldValue::owned_any))
            })
        },
    );

    if let Some(desc) = &table.description {
        field = field.description(desc);
    }
    for argument in arguments {
        field = field.argument(argument);
    }

    Ok(Object::new(QUERY).field(field))
}

fn is_input_scalar(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Named(_) => true,
        TypeRef::NonNull(inner) => is_input_scalar(inner),
        TypeRef::List(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDescriptor, ForeignKey, LookupTarget, NativeType, TableRef};
    use crate::schema::links::LinkAffordances;
    use crate::schema::object::FieldDef;

    fn item() -> TableDescriptor {
        TableDescriptor::new("lists", "Item")
            .column(ColumnDescriptor::new("id", NativeType::Integer).required())
            .column(ColumnDescriptor::new("ownerId", NativeType::Integer).foreign_key(
                ForeignKey::Lookup(LookupTarget {
                    schema: "lists".to_string(),
                    table: "User".to_string(),
                    column: "id".to_string(),
                }),
            ))
    }

    fn item_type() -> ObjectTypeDef {
        ObjectTypeDef {
            name: "lists__Item".to_string(),
            description: None,
            fields: vec![
                FieldDef {
                    name: "id".to_string(),
                    description: None,
                    ty: TypeRef::named_nn(TypeRef::INT),
                    resolution: FieldResolution::Passthrough,
                },
                FieldDef {
                    name: "ownerId".to_string(),
                    description: None,
                    ty: TypeRef::named("lists__User"),
                    resolution: FieldResolution::Lookup {
                        table: TableRef::new("lists", "User"),
                        column: "id".to_string(),
                    },
                },
            ],
            links: LinkAffordances::default(),
        }
    }

    #[test]
    fn test_scalar_primary_key() {
        let query = build_root(&item().primary_key(["id"]), &item_type()).unwrap();
        assert_eq!(query.type_name(), "Query");
    }

    #[test]
    fn test_unknown_primary_key() {
        let result = build_root(&item().primary_key(["rowid"]), &item_type());
        assert!(matches!(result, Err(TablegraphError::SchemaBuild(_))));
    }

    #[test]
    fn test_reference_primary_key_rejected() {
        let result = build_root(&item().primary_key(["ownerId"]), &item_type());
        assert!(matches!(result, Err(TablegraphError::SchemaBuild(_))));
    }

    #[test]
    fn test_list_type_rejected() {
        assert!(is_input_scalar(&TypeRef::named_nn(TypeRef::ID)));
        assert!(!is_input_scalar(&TypeRef::named_list(TypeRef::INT)));
    }
}
