//! Decoding of deepObject query pairs into typed destinations.
//!
//! ### An overview of the decode pipeline
//!
//! Query parameters arrive unordered: `p[o][ID]=456&p[b]=true&p[o][Name]=Joe`
//! carries one record spread over three unrelated entries. Decoding therefore
//! runs in two steps.
//!
//! First, every parameter belonging to `param_name` is split into its bracket
//! path and folded into a [`Node`] tree, so sibling fields meet again no
//! matter the order they arrived in. A node is either `Interior` (nested
//! fields) or `Leaf` (the raw values of one parameter); a path can never be
//! both, and conflicting inputs are rejected while building.
//!
//! Second, the tree is walked together with the destination. Each supported
//! destination shape implements [`Assign`](crate::Assign) for exactly one
//! tree form: records and maps consume `Interior` nodes, scalars and
//! sequences consume `Leaf` nodes, converting the raw strings at the edges.

pub(crate) mod assign;
mod parse;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::path;

pub use assign::{Assign, Binder};
pub use parse::parse_query;

/// Raw query parameters: each key maps to the ordered list of values it
/// appeared with, following the multi-value query convention.
pub type Params = HashMap<String, Vec<String>>;

/// One node of the decoded parameter tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Nested structure: field name to child node.
    Interior(BTreeMap<String, Node>),
    /// Terminal raw values, in arrival order, never empty.
    Leaf(Vec<String>),
}

impl Node {
    /// The node's fields, or a shape error for a leaf.
    pub fn fields(&self) -> Result<&BTreeMap<String, Node>> {
        match self {
            Node::Interior(fields) => Ok(fields),
            Node::Leaf(_) => Err(Error::ShapeMismatch {
                expected: "nested fields",
                found: self.kind(),
            }),
        }
    }

    /// The node's raw values, or a shape error for an interior node.
    pub fn values(&self) -> Result<&[String]> {
        match self {
            Node::Leaf(values) => Ok(values),
            Node::Interior(_) => Err(Error::ShapeMismatch {
                expected: "a list of values",
                found: self.kind(),
            }),
        }
    }

    /// The first raw value, used by every scalar destination.
    pub fn value(&self) -> Result<&str> {
        self.values()?
            .first()
            .map(String::as_str)
            .ok_or(Error::ShapeMismatch {
                expected: "at least one value",
                found: "an empty value list",
            })
    }

    fn kind(&self) -> &'static str {
        match self {
            Node::Interior(_) => "nested fields",
            Node::Leaf(_) => "a list of values",
        }
    }
}

/// Decodes the deepObject parameters of `param_name` into `dst`.
///
/// Only keys starting with `param_name[` are consumed; every other entry in
/// `params` is ignored. Fields without a matching parameter are left
/// untouched. On error the destination may already be partially assigned and
/// should be treated as undefined.
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// struct Inner {
///     name: String,
///     id: i32,
/// }
///
/// deepobject::assign_struct! {
///     Inner {
///         name => "Name",
///         id => "ID",
///     }
/// }
///
/// let params = deepobject::parse_query("p[Name]=Joe&p[ID]=456&other=1").unwrap();
/// let mut inner = Inner::default();
/// deepobject::decode(&mut inner, "p", &params).unwrap();
/// assert_eq!(
///     inner,
///     Inner {
///         name: "Joe".to_owned(),
///         id: 456,
///     }
/// );
/// ```
pub fn decode<T: Assign>(dst: &mut T, param_name: &str, params: &Params) -> Result<()> {
    Config::default().decode(dst, param_name, params)
}

/// Parses `query` with [`parse_query`] and decodes `param_name` from it.
pub fn decode_query<T: Assign>(dst: &mut T, param_name: &str, query: &str) -> Result<()> {
    Config::default().decode_query(dst, param_name, query)
}

pub(crate) fn decode_with<T: Assign>(
    config: Config,
    dst: &mut T,
    param_name: &str,
    params: &Params,
) -> Result<()> {
    let tree = build_tree(params, param_name, config)?;
    dst.assign(&tree)
}

/// Builds the parameter tree for `param_name` out of raw params.
fn build_tree(params: &Params, param_name: &str, config: Config) -> Result<Node> {
    let mut root = BTreeMap::new();
    let mut selected = 0usize;
    for (key, values) in params {
        let Some(subscript) = path::strip_param(key, param_name) else {
            continue;
        };
        selected += 1;
        let segments = path::decode_path(subscript, key)?;
        if segments.len() > config.max_depth {
            return Err(Error::malformed(
                key,
                format!(
                    "nesting depth {} exceeds the configured maximum of {}",
                    segments.len(),
                    config.max_depth
                ),
            ));
        }
        if values.is_empty() {
            return Err(Error::malformed(key, "parameter has no values"));
        }
        insert(&mut root, &segments, values, key)?;
    }
    log::debug!("selected {selected} of {} parameters for `{param_name}`", params.len());
    let tree = Node::Interior(root);
    log::trace!("built tree for `{param_name}`: {tree:?}");
    Ok(tree)
}

fn insert(
    fields: &mut BTreeMap<String, Node>,
    segments: &[&str],
    values: &[String],
    key: &str,
) -> Result<()> {
    // the path codec never yields an empty segment list
    let Some((first, rest)) = segments.split_first() else {
        return Err(Error::malformed(key, "empty bracket path"));
    };
    if rest.is_empty() {
        match fields.entry((*first).to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(Node::Leaf(values.to_vec()));
                Ok(())
            }
            // a repeated key merges its values upstream in `Params`, so a
            // second arrival here means two spellings decoded to one path
            Entry::Occupied(entry) => match entry.get() {
                Node::Leaf(_) => {
                    Err(Error::malformed(key, "duplicate parameter for this path"))
                }
                Node::Interior(_) => Err(Error::malformed(
                    key,
                    "path is used both as a value and as nested fields",
                )),
            },
        }
    } else {
        let child = fields
            .entry((*first).to_owned())
            .or_insert_with(|| Node::Interior(BTreeMap::new()));
        match child {
            Node::Interior(children) => insert(children, rest, values, key),
            Node::Leaf(_) => Err(Error::malformed(
                key,
                "path is used both as a value and as nested fields",
            )),
        }
    }
}
