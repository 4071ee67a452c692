/// Object types built from table metadata
///
/// `ObjectTypeBuilder` turns a table's columns into an `ObjectTypeDef`, one
/// field per column. Foreign keys become references to the target table's
/// object type, which is built through the `TypeRegistry` so that cycles and
/// repeated targets collapse onto one named type.

use crate::catalog::{ColumnDescriptor, ForeignKey, LookupTarget, MetadataProvider, TableDescriptor};
use crate::config::{OwningUserConfig, SchemaOptions};
use crate::error::Result;
use crate::schema::links::{links_field, LinkAffordances, HAS_LINKS, LINKS_FIELD};
use crate::schema::registry::TypeRegistry;
use crate::schema::resolver::{column_resolver, FieldResolution};
use crate::schema::type_mapping::column_type;

use async_graphql::dynamic::{Field, Object, TypeRef};
use std::sync::Arc;

/// A column field before it is materialized
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub resolution: FieldResolution,
}

/// An object type for one table
#[derive(Debug, Clone)]
pub struct ObjectTypeDef {
    pub name: String,
    pub description: Option<String>,
    /// Column fields in column order; the `links` field is added on materialization
    pub fields: Vec<FieldDef>,
    pub links: LinkAffordances,
}

impl ObjectTypeDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Materialize as a dynamic object with resolvers
    pub fn into_object(self) -> Object {
        let mut object = Object::new(self.name).implement(HAS_LINKS);

        if let Some(desc) = self.description {
            object = object.description(desc);
        }

        for field in self.fields {
            let mut graphql_field = Field::new(
                field.name.clone(),
                field.ty,
                column_resolver(field.name, field.resolution),
            );
            if let Some(desc) = field.description {
                graphql_field = graphql_field.description(desc);
            }
            object = object.field(graphql_field);
        }

        object.field(links_field(self.links))
    }
}

/// Builds table object types, recursing into foreign-key targets
pub struct ObjectTypeBuilder<'a> {
    metadata: &'a dyn MetadataProvider,
    options: &'a SchemaOptions,
    owning_user: &'a OwningUserConfig,
}

impl<'a> ObjectTypeBuilder<'a> {
    pub fn new(
        metadata: &'a dyn MetadataProvider,
        options: &'a SchemaOptions,
        owning_user: &'a OwningUserConfig,
    ) -> Self {
        Self {
            metadata,
            options,
            owning_user,
        }
    }

    /// Ensure the table's type exists and return its name
    ///
    /// The owning-user table always uses the canonical user type name; every
    /// other table uses its deterministic name.
    pub fn ensure_table_type(
        &self,
        registry: &mut TypeRegistry,
        table: &TableDescriptor,
    ) -> Result<String> {
        let name = self.type_name(table);
        self.ensure_named(registry, table, &name)?;
        Ok(name)
    }

    fn type_name(&self, table: &TableDescriptor) -> String {
        if table.schema.eq_ignore_ascii_case(&self.owning_user.schema)
            && table.name.eq_ignore_ascii_case(&self.owning_user.table)
        {
            self.owning_user.type_name.clone()
        } else {
            table.table_ref().type_name()
        }
    }

    fn ensure_named(
        &self,
        registry: &mut TypeRegistry,
        table: &TableDescriptor,
        name: &str,
    ) -> Result<()> {
        registry.ensure(name, |registry| {
            self.build_object_type(registry, table, name)
        })?;
        Ok(())
    }

    /// Build the object type for `table` under `name`
    ///
    /// Foreign-key targets are ensured in `registry` as a side effect.
    pub fn build_object_type(
        &self,
        registry: &mut TypeRegistry,
        table: &TableDescriptor,
        name: &str,
    ) -> Result<ObjectTypeDef> {
        tracing::debug!("Building object type '{}' for {}", name, table.table_ref());

        let mut fields = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            if column.name == LINKS_FIELD {
                tracing::warn!(
                    "Column '{}' of {} is shadowed by the link field and is not exposed",
                    column.name,
                    table.table_ref()
                );
                continue;
            }
            fields.push(self.column_field(registry, table, column)?);
        }

        Ok(ObjectTypeDef {
            name: name.to_string(),
            description: table.description.clone(),
            fields,
            links: LinkAffordances::from_table(table),
        })
    }

    fn column_field(
        &self,
        registry: &mut TypeRegistry,
        table: &TableDescriptor,
        column: &ColumnDescriptor,
    ) -> Result<FieldDef> {
        let scalar = column_type(table, column, self.options.unsupported_scalars)?;

        let (ty, resolution) = match &column.foreign_key {
            None | Some(ForeignKey::RowId) => (scalar, FieldResolution::Passthrough),

            Some(ForeignKey::OwningUser { column: user_column }) => {
                let target = LookupTarget {
                    schema: self.owning_user.schema.clone(),
                    table: self.owning_user.table.clone(),
                    column: user_column.clone(),
                };
                match self.target(table, column, &target)? {
                    Some(users) => {
                        let name = self.ensure_table_type(registry, &users)?;
                        (
                            TypeRef::named(name),
                            FieldResolution::Lookup {
                                table: users.table_ref(),
                                column: user_column.clone(),
                            },
                        )
                    }
                    None => (scalar, FieldResolution::Passthrough),
                }
            }

            Some(ForeignKey::Lookup(target)) => {
                match self.target(table, column, target)? {
                    Some(lookup) => {
                        let name = self.ensure_table_type(registry, &lookup)?;
                        (
                            TypeRef::named(name),
                            FieldResolution::Lookup {
                                table: lookup.table_ref(),
                                column: target.column.clone(),
                            },
                        )
                    }
                    None => (scalar, FieldResolution::Passthrough),
                }
            }

            Some(ForeignKey::MultiValued(junction)) => {
                match self.target(table, column, &junction.target())? {
                    Some(lookup) => {
                        let name = self.ensure_table_type(registry, &lookup)?;
                        (
                            TypeRef::named_list(name),
                            FieldResolution::Junction {
                                source_column: junction
                                    .source_column
                                    .clone()
                                    .unwrap_or_else(|| column.name.clone()),
                                target: lookup.table_ref(),
                                target_column: junction.column.clone(),
                                junction: junction.junction_ref(),
                                junction_key: junction.junction_key.clone(),
                                junction_lookup: junction.junction_lookup.clone(),
                            },
                        )
                    }
                    None => (
                        TypeRef::List(Box::new(scalar)),
                        FieldResolution::PassthroughList,
                    ),
                }
            }
        };

        Ok(FieldDef {
            name: column.name.clone(),
            description: column.description.clone(),
            ty,
            resolution,
        })
    }

    /// Resolve a foreign-key target table; `None` when it cannot be located
    fn target(
        &self,
        table: &TableDescriptor,
        column: &ColumnDescriptor,
        target: &LookupTarget,
    ) -> Result<Option<Arc<TableDescriptor>>> {
        match self.metadata.lookup_table(target) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    "Foreign key {}.{} targets {} which cannot be found ({}); exposing the plain value",
                    table.table_ref(),
                    column.name,
                    target.table_ref(),
                    e
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
