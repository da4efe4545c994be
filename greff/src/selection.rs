//! # Selection Documents
//!
//! A JSON rendition of a selection tree, written with declared type and field names and
//! resolved against a loaded registry.
//!
//! ```json
//! {
//!   "selections": [
//!     {
//!       "type": "Book",
//!       "args": { "id": "1" },
//!       "fields": [
//!         "title",
//!         { "fragment_ref": "Credits" },
//!         { "on": "Ebook", "fields": ["format"] }
//!       ]
//!     }
//!   ],
//!   "fragments": [{ "fragment": "Credits", "on": "Book", "fields": [{ "field": "authors", "fields": ["name"] }] }]
//! }
//! ```
//!
//! Plain strings naming a declared field of the enclosing type are compiled with the field's
//! wire name. Any other string is sent as written.
use anyhow::{Context, Result, anyhow, bail};
use greff_core::{
    query::{Fragment, Head, Item, Selection, argument, fragment, fragment_ref, on},
    schema::{Registry, TypeDescriptor},
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionDocument {
    pub selections: Vec<NodeSpec>,
    #[serde(default)]
    pub fragments: Vec<FragmentSpec>,
}

/// A head and its field list. Exactly one of `type`, `field` or `on` names the head.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub field: Option<String>,
    pub on: Option<String>,
    #[serde(default)]
    pub args: IndexMap<String, String>,
    pub fields: Vec<ItemSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemSpec {
    Name(String),
    Node(NodeSpec),
    FragmentRef(FragmentRefSpec),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentRefSpec {
    pub fragment_ref: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentSpec {
    pub fragment: String,
    pub on: String,
    pub fields: Vec<ItemSpec>,
}

impl SelectionDocument {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Invalid selection document")
    }

    /// Resolves every name against `registry`.
    pub fn resolve(&self, registry: &Registry) -> Result<(Vec<Selection>, Vec<Fragment>)> {
        let resolver = Resolver { registry };

        let selections = self
            .selections
            .iter()
            .map(|node| resolver.node(node, None))
            .collect::<Result<Vec<_>>>()?;

        let fragments = self
            .fragments
            .iter()
            .map(|spec| resolver.fragment(spec))
            .collect::<Result<Vec<_>>>()?;

        Ok((selections, fragments))
    }
}

struct Resolver<'r> {
    registry: &'r Registry,
}

impl Resolver<'_> {
    fn node(&self, node: &NodeSpec, context: Option<&Arc<TypeDescriptor>>) -> Result<Selection> {
        let (head, scope) = match (&node.type_name, &node.field, &node.on) {
            (Some(name), None, None) => {
                let descriptor = self.ty(name)?;
                let head = if node.args.is_empty() {
                    Head::Type(descriptor.clone())
                } else {
                    Head::Operation(argument(descriptor.clone(), node.args.clone()))
                };
                (head, Some(descriptor))
            }
            (None, Some(name), None) => {
                let owner = context.ok_or_else(|| {
                    anyhow!("Field '{name}' needs an enclosing type, use `type` at the root")
                })?;
                let field = owner
                    .field(name)
                    .cloned()
                    .ok_or_else(|| anyhow!("Type '{}' has no field '{name}'", owner.name()))?;

                // Unresolved references only fail once a payload needs them.
                let scope = field
                    .referenced_type()
                    .and_then(|target| self.registry.resolve_by_name(target))
                    .cloned();

                let head = if node.args.is_empty() {
                    Head::Field(field)
                } else {
                    Head::Operation(argument(field, node.args.clone()))
                };
                (head, scope)
            }
            (None, None, Some(name)) => {
                if !node.args.is_empty() {
                    bail!("Inline fragment on '{name}' cannot take arguments");
                }
                let descriptor = self.ty(name)?;
                (Head::Operation(on(descriptor.clone())), Some(descriptor))
            }
            _ => bail!("A selection needs exactly one of `type`, `field` or `on`"),
        };

        let items = self.items(&node.fields, scope.as_ref())?;
        Ok(Selection { head, items })
    }

    fn items(
        &self,
        specs: &[ItemSpec],
        scope: Option<&Arc<TypeDescriptor>>,
    ) -> Result<Vec<Item>> {
        specs
            .iter()
            .map(|spec| match spec {
                ItemSpec::Name(name) => Ok(scope
                    .and_then(|descriptor| descriptor.field(name))
                    .map(|field| Item::Field(field.clone()))
                    .unwrap_or_else(|| Item::Name(name.clone()))),
                ItemSpec::Node(node) => self.node(node, scope).map(Item::Selection),
                ItemSpec::FragmentRef(spec) => {
                    Ok(Item::Operation(fragment_ref(spec.fragment_ref.as_str())))
                }
            })
            .collect()
    }

    fn fragment(&self, spec: &FragmentSpec) -> Result<Fragment> {
        let descriptor = self.ty(&spec.on)?;
        let items = self.items(&spec.fields, Some(&descriptor))?;

        Ok(Fragment::new(
            fragment(spec.fragment.as_str(), descriptor),
            items,
        ))
    }

    fn ty(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        self.registry
            .resolve_by_name(name)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown type '{name}'"))
    }
}
