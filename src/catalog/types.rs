use crate::catalog::template::UrlTemplate;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(schema, table)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Deterministic GraphQL type name for this table
    pub fn type_name(&self) -> String {
        type_name_for(&self.schema, &self.table)
    }

    /// Name the table is registered under in the query engine
    pub fn source_name(&self) -> String {
        self.type_name().to_lowercase()
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// `<schema>__<table>` with dots replaced, e.g. `exp.data` + `CellLine` → `exp_data__CellLine`
pub fn type_name_for(schema: &str, table: &str) -> String {
    format!("{}__{}", schema.replace('.', "_"), table.replace('.', "_"))
}

/// Native column data types as reported by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NativeType {
    Boolean,
    BigInt,
    Decimal,
    Double,
    Real,
    SmallInt,
    Integer,
    TinyInt,
    Date,
    Time,
    Timestamp,
    Char,
    VarChar,
    LongVarChar,
    Guid,
    Binary,
    VarBinary,
    LongVarBinary,
    Null,
    Other,
    /// A type name the catalog does not know
    Unrecognized(String),
}

impl NativeType {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => NativeType::Boolean,
            "bigint" | "long" => NativeType::BigInt,
            "decimal" | "numeric" => NativeType::Decimal,
            "double" => NativeType::Double,
            "real" | "float" => NativeType::Real,
            "smallint" => NativeType::SmallInt,
            "integer" | "int" => NativeType::Integer,
            "tinyint" => NativeType::TinyInt,
            "date" => NativeType::Date,
            "time" => NativeType::Time,
            "timestamp" | "datetime" => NativeType::Timestamp,
            "char" => NativeType::Char,
            "varchar" | "string" | "text" => NativeType::VarChar,
            "longvarchar" => NativeType::LongVarChar,
            "guid" | "uuid" | "entityid" => NativeType::Guid,
            "binary" => NativeType::Binary,
            "varbinary" => NativeType::VarBinary,
            "longvarbinary" => NativeType::LongVarBinary,
            "null" => NativeType::Null,
            "other" => NativeType::Other,
            _ => NativeType::Unrecognized(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NativeType::Boolean => "boolean",
            NativeType::BigInt => "bigint",
            NativeType::Decimal => "decimal",
            NativeType::Double => "double",
            NativeType::Real => "real",
            NativeType::SmallInt => "smallint",
            NativeType::Integer => "integer",
            NativeType::TinyInt => "tinyint",
            NativeType::Date => "date",
            NativeType::Time => "time",
            NativeType::Timestamp => "timestamp",
            NativeType::Char => "char",
            NativeType::VarChar => "varchar",
            NativeType::LongVarChar => "longvarchar",
            NativeType::Guid => "guid",
            NativeType::Binary => "binary",
            NativeType::VarBinary => "varbinary",
            NativeType::LongVarBinary => "longvarbinary",
            NativeType::Null => "null",
            NativeType::Other => "other",
            NativeType::Unrecognized(name) => name,
        }
    }
}

impl From<String> for NativeType {
    fn from(name: String) -> Self {
        NativeType::parse(&name)
    }
}

impl From<NativeType> for String {
    fn from(native: NativeType) -> Self {
        native.as_str().to_string()
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of an ordinary lookup: the row of `schema.table` whose `column` equals the stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTarget {
    pub schema: String,
    pub table: String,
    pub column: String,
}

impl LookupTarget {
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.schema, &self.table)
    }
}

/// Many-valued relationship through a junction table
///
/// For a source value `v`, the related rows are the rows of `schema.table`
/// whose `column` appears in
/// `SELECT junction_lookup FROM junction_schema.junction_table WHERE junction_key = v`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Junction {
    pub schema: String,
    pub table: String,
    pub column: String,
    /// Defaults to the target schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub junction_schema: Option<String>,
    pub junction_table: String,
    /// Junction column matched against the source value
    pub junction_key: String,
    /// Junction column holding the target key
    pub junction_lookup: String,
    /// Source column whose value is matched against `junction_key`;
    /// defaults to the annotated column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
}

impl Junction {
    pub fn target(&self) -> LookupTarget {
        LookupTarget {
            schema: self.schema.clone(),
            table: self.table.clone(),
            column: self.column.clone(),
        }
    }

    pub fn junction_ref(&self) -> TableRef {
        TableRef::new(
            self.junction_schema.as_deref().unwrap_or(&self.schema),
            &self.junction_table,
        )
    }
}

/// Kind of foreign key on a column, decided once when the catalog is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForeignKey {
    /// Primary-key style reference to the same row; stays a scalar
    RowId,
    /// Reference to the well-known users table
    OwningUser {
        #[serde(default = "default_user_column")]
        column: String,
    },
    Lookup(LookupTarget),
    MultiValued(Junction),
}

fn default_user_column() -> String {
    "UserId".to_string()
}

/// Link template setting: a template, or explicitly disabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkTemplate {
    /// Written as `false` in the catalog
    Disabled(DisabledFlag),
    Template(UrlTemplate),
}

/// Boolean that only deserializes from `false`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "bool", into = "bool")]
pub struct DisabledFlag;

impl TryFrom<bool> for DisabledFlag {
    type Error = &'static str;

    fn try_from(value: bool) -> std::result::Result<Self, Self::Error> {
        if value {
            Err("link templates can only be disabled with `false`")
        } else {
            Ok(DisabledFlag)
        }
    }
}

impl From<DisabledFlag> for bool {
    fn from(_: DisabledFlag) -> Self {
        false
    }
}

impl LinkTemplate {
    pub fn disabled() -> Self {
        LinkTemplate::Disabled(DisabledFlag)
    }

    pub fn template(&self) -> Option<&UrlTemplate> {
        match self {
            LinkTemplate::Disabled(_) => None,
            LinkTemplate::Template(template) => Some(template),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub native_type: NativeType,
    pub required: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, native_type: NativeType) -> Self {
        Self {
            name: name.into(),
            description: None,
            native_type,
            required: false,
            foreign_key: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_key = Some(foreign_key);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    pub description: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
    pub primary_key: Vec<String>,
    pub details_url: Option<LinkTemplate>,
    pub update_url: Option<LinkTemplate>,
}

impl TableDescriptor {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            description: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            details_url: None,
            update_url: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn details_url(mut self, setting: LinkTemplate) -> Self {
        self.details_url = Some(setting);
        self
    }

    pub fn update_url(mut self, setting: LinkTemplate) -> Self {
        self.update_url = Some(setting);
        self
    }

    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.schema, &self.name)
    }

    /// Find a column, exact name first, then case-insensitively
    pub fn find_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_replaces_dots() {
        assert_eq!(type_name_for("exp.data", "CellLine"), "exp_data__CellLine");
        assert_eq!(TableRef::new("core", "Users").type_name(), "core__Users");
        assert_eq!(TableRef::new("core", "Users").source_name(), "core__users");
    }

    #[test]
    fn test_native_type_parse() {
        assert_eq!(NativeType::parse("BIGINT"), NativeType::BigInt);
        assert_eq!(NativeType::parse("varchar"), NativeType::VarChar);
        assert_eq!(NativeType::parse("guid"), NativeType::Guid);
        assert_eq!(
            NativeType::parse("geometry"),
            NativeType::Unrecognized("geometry".to_string())
        );
        assert_eq!(NativeType::parse("geometry").as_str(), "geometry");
    }

    #[test]
    fn test_deserialize_foreign_keys() {
        #[derive(Deserialize)]
        struct Holder {
            lookup: ForeignKey,
        }

        let fk: Holder = toml::from_str(
            r#"lookup = { kind = "lookup", schema = "core", table = "Users", column = "UserId" }"#,
        )
        .unwrap();
        assert_eq!(
            fk.lookup,
            ForeignKey::Lookup(LookupTarget {
                schema: "core".to_string(),
                table: "Users".to_string(),
                column: "UserId".to_string(),
            })
        );

        let fk: Holder = toml::from_str(r#"lookup = { kind = "owning_user" }"#).unwrap();
        assert_eq!(
            fk.lookup,
            ForeignKey::OwningUser {
                column: "UserId".to_string()
            }
        );

        let fk: Holder = toml::from_str(r#"lookup = { kind = "row_id" }"#).unwrap();
        assert_eq!(fk.lookup, ForeignKey::RowId);
    }

    #[test]
    fn test_junction_defaults_to_target_schema() {
        let junction = Junction {
            schema: "lists".to_string(),
            table: "Tag".to_string(),
            column: "id".to_string(),
            junction_schema: None,
            junction_table: "ItemTags".to_string(),
            junction_key: "itemId".to_string(),
            junction_lookup: "tagId".to_string(),
            source_column: None,
        };
        assert_eq!(junction.junction_ref(), TableRef::new("lists", "ItemTags"));
        assert_eq!(junction.target().table_ref(), TableRef::new("lists", "Tag"));
    }

    #[test]
    fn test_link_template_settings() {
        #[derive(Deserialize)]
        struct Holder {
            url: LinkTemplate,
        }

        let holder: Holder = toml::from_str("url = false").unwrap();
        assert_eq!(holder.url, LinkTemplate::disabled());
        assert!(holder.url.template().is_none());

        let holder: Holder = toml::from_str(r#"url = "/details?id=${id}""#).unwrap();
        assert_eq!(holder.url.template().unwrap().as_str(), "/details?id=${id}");

        assert!(toml::from_str::<Holder>("url = true").is_err());
    }
}
