use tablegraph::catalog::{ForeignKey, Junction, LinkTemplate, LookupTarget, NativeType, UrlTemplate};
use tablegraph::config::{
    ColumnConfig, Config, OwningUserConfig, SchemaConfig, SchemaOptions, TableConfig,
};
use tablegraph::error::Result;

/// Query suggested after `init`
pub const DEMO_QUERY: &str = "{ Item(id: 1) { name ownerId { name } tags { name } } }";

/// CSV files written by `init`, relative to the output directory
pub const DEMO_DATA: &[(&str, &str)] = &[
    (
        "data/core_users.csv",
        "UserId,DisplayName,Email\n\
         1,alice,alice@example.com\n\
         2,bob,bob@example.com\n",
    ),
    (
        "data/lists_user.csv",
        "id,name\n\
         7,bob\n\
         8,carol\n",
    ),
    (
        "data/lists_tag.csv",
        "id,name\n\
         1,red\n\
         2,blue\n\
         3,green\n",
    ),
    (
        "data/lists_item_tags.csv",
        "itemId,tagId\n\
         1,1\n\
         1,3\n\
         2,2\n",
    ),
    (
        "data/lists_item.csv",
        "id,name,price,ownerId,parentId,CreatedBy\n\
         1,widget,2.5,7,,1\n\
         2,gadget,10.0,8,1,2\n\
         3,gizmo,4.25,,1,\n",
    ),
];

fn column(name: &str, native_type: NativeType) -> ColumnConfig {
    ColumnConfig {
        name: name.to_string(),
        native_type,
        required: false,
        description: None,
        lookup: None,
    }
}

fn required(mut column: ColumnConfig) -> ColumnConfig {
    column.required = true;
    column
}

fn lookup(mut column: ColumnConfig, foreign_key: ForeignKey) -> ColumnConfig {
    column.lookup = Some(foreign_key);
    column
}

fn table(name: &str, description: &str, data: &str, columns: Vec<ColumnConfig>) -> TableConfig {
    TableConfig {
        name: name.to_string(),
        description: Some(description.to_string()),
        primary_key: columns.first().map(|c| c.name.clone()).into_iter().collect(),
        details_url: None,
        update_url: None,
        data: Some(data.to_string()),
        column: columns,
    }
}

fn link(template: &str) -> Result<Option<LinkTemplate>> {
    Ok(Some(LinkTemplate::Template(UrlTemplate::parse(template)?)))
}

/// Example configuration over `DEMO_DATA`
pub fn demo_config() -> Result<Config> {
    let users = TableConfig {
        details_url: link("/core/users/details?userId=${UserId}")?,
        ..table(
            "Users",
            "Site users; every CreatedBy column points here",
            "data/core_users.csv",
            vec![
                required(column("UserId", NativeType::Integer)),
                column("DisplayName", NativeType::VarChar),
                column("Email", NativeType::VarChar),
            ],
        )
    };

    let item = TableConfig {
        details_url: link("/lists/items/details?id=${id}")?,
        update_url: link("/lists/items/update?id=${id}")?,
        ..table(
            "Item",
            "Things on a list",
            "data/lists_item.csv",
            vec![
                required(column("id", NativeType::Integer)),
                column("name", NativeType::VarChar),
                column("price", NativeType::Double),
                lookup(
                    column("ownerId", NativeType::Integer),
                    ForeignKey::Lookup(LookupTarget {
                        schema: "lists".to_string(),
                        table: "User".to_string(),
                        column: "id".to_string(),
                    }),
                ),
                lookup(
                    column("parentId", NativeType::Integer),
                    ForeignKey::Lookup(LookupTarget {
                        schema: "lists".to_string(),
                        table: "Item".to_string(),
                        column: "id".to_string(),
                    }),
                ),
                lookup(
                    column("CreatedBy", NativeType::Integer),
                    ForeignKey::OwningUser {
                        column: "UserId".to_string(),
                    },
                ),
                lookup(
                    column("tags", NativeType::Integer),
                    ForeignKey::MultiValued(Junction {
                        schema: "lists".to_string(),
                        table: "Tag".to_string(),
                        column: "id".to_string(),
                        junction_schema: None,
                        junction_table: "ItemTags".to_string(),
                        junction_key: "itemId".to_string(),
                        junction_lookup: "tagId".to_string(),
                        source_column: Some("id".to_string()),
                    }),
                ),
            ],
        )
    };

    let mut item_tags = table(
        "ItemTags",
        "Junction between items and tags",
        "data/lists_item_tags.csv",
        vec![
            required(column("itemId", NativeType::Integer)),
            required(column("tagId", NativeType::Integer)),
        ],
    );
    item_tags.primary_key = vec!["itemId".to_string(), "tagId".to_string()];

    Ok(Config {
        schema: SchemaOptions {
            max_depth: Some(16),
            ..SchemaOptions::default()
        },
        owning_user: OwningUserConfig::default(),
        catalog: vec![
            SchemaConfig {
                name: "core".to_string(),
                table: vec![users],
            },
            SchemaConfig {
                name: "lists".to_string(),
                table: vec![
                    item,
                    table(
                        "User",
                        "List owners",
                        "data/lists_user.csv",
                        vec![
                            required(column("id", NativeType::Integer)),
                            column("name", NativeType::VarChar),
                        ],
                    ),
                    table(
                        "Tag",
                        "Labels attached to items",
                        "data/lists_tag.csv",
                        vec![
                            required(column("id", NativeType::Integer)),
                            column("name", NativeType::VarChar),
                        ],
                    ),
                    item_tags,
                ],
            },
        ],
    })
}
