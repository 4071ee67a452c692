/// Link affordances: the `links` field every object type carries
///
/// A table may configure a details and an update URL template. At resolve
/// time the templates are evaluated against the row and exposed as a list of
/// `Link { rel, href }` objects.

use crate::catalog::{LinkTemplate, TableDescriptor, UrlTemplate};
use crate::source::Row;

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, Interface, InterfaceField, Object, ResolverContext, TypeRef,
};
use std::sync::Arc;

pub const LINK: &str = "Link";
pub const HAS_LINKS: &str = "HasLinks";
pub const LINKS_FIELD: &str = "links";

/// One resolved hyperlink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// Link templates of one table, in output order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkAffordances {
    templates: Vec<(&'static str, UrlTemplate)>,
}

impl LinkAffordances {
    /// Collect the table's configured templates: `details` first, then `update`
    pub fn from_table(table: &TableDescriptor) -> Self {
        let templates = [("details", &table.details_url), ("update", &table.update_url)]
            .into_iter()
            .filter_map(|(rel, setting)| match setting {
                Some(LinkTemplate::Template(template)) => Some((rel, template.clone())),
                Some(LinkTemplate::Disabled(_)) | None => None,
            })
            .collect();

        Self { templates }
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Links for a row; a template whose placeholders cannot be filled is skipped
    pub fn links_for(&self, row: &Row) -> Vec<Link> {
        self.templates
            .iter()
            .filter_map(|(rel, template)| {
                template.eval(row).map(|href| Link {
                    rel: rel.to_string(),
                    href,
                })
            })
            .collect()
    }
}

fn links_type() -> TypeRef {
    TypeRef::named_list_nn(LINK)
}

/// The shared `links` field
pub fn links_field(affordances: LinkAffordances) -> Field {
    let affordances = Arc::new(affordances);

    Field::new(LINKS_FIELD, links_type(), move |ctx: ResolverContext| {
        let affordances = Arc::clone(&affordances);
        FieldFuture::new(async move {
            let row = ctx.parent_value.try_downcast_ref::<Row>()?;
            let links = affordances.links_for(row);
            Ok(Some(FieldValue::list(
                links.into_iter().map(FieldValue::owned_any),
            )))
        })
    })
    .description("Hyperlinks for this row")
}

/// The `Link` object type
pub fn link_object() -> Object {
    Object::new(LINK)
        .description("A hyperlink with its relation")
        .field(Field::new("rel", TypeRef::named_nn(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move {
                let link = ctx.parent_value.try_downcast_ref::<Link>()?;
                Ok(Some(FieldValue::value(link.rel.clone())))
            })
        }))
        .field(Field::new("href", TypeRef::named_nn(TypeRef::STRING), |ctx| {
            FieldFuture::new(async move {
                let link = ctx.parent_value.try_downcast_ref::<Link>()?;
                Ok(Some(FieldValue::value(link.href.clone())))
            })
        }))
}

/// The `HasLinks` interface every table type implements
pub fn has_links_interface() -> Interface {
    Interface::new(HAS_LINKS)
        .description("A row that exposes hyperlinks")
        .field(InterfaceField::new(LINKS_FIELD, links_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::Value;

    fn row(id: Value) -> Row {
        Row::from_iter([("RowId", id), ("Name", Value::String("a b".to_string()))])
    }

    fn table() -> TableDescriptor {
        TableDescriptor::new("lists", "Item")
            .details_url(LinkTemplate::Template(
                UrlTemplate::parse("/items/details?rowId=${rowid}").unwrap(),
            ))
            .update_url(LinkTemplate::Template(
                UrlTemplate::parse("/items/update?name=${Name}").unwrap(),
            ))
    }

    #[test]
    fn test_links_in_order() {
        let links = LinkAffordances::from_table(&table()).links_for(&row(Value::Number(4.into())));
        assert_eq!(
            links,
            vec![
                Link {
                    rel: "details".to_string(),
                    href: "/items/details?rowId=4".to_string(),
                },
                Link {
                    rel: "update".to_string(),
                    href: "/items/update?name=a%20b".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_disabled_template_skipped() {
        let table = table().update_url(LinkTemplate::disabled());
        let links = LinkAffordances::from_table(&table).links_for(&row(Value::Number(4.into())));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rel, "details");
    }

    #[test]
    fn test_missing_value_skips_link() {
        let links = LinkAffordances::from_table(&table()).links_for(&row(Value::Null));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rel, "update");
    }

    #[test]
    fn test_no_templates_is_empty() {
        let affordances = LinkAffordances::from_table(&TableDescriptor::new("lists", "Item"));
        assert!(affordances.is_empty());
        assert!(affordances.links_for(&row(Value::Number(1.into()))).is_empty());
    }
}
