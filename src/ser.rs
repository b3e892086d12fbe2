//! Encoding of values into deepObject query pairs.

mod tree;

use crate::error::Result;
use crate::path;
use tree::Value;

/// Encodes a value as deepObject query parameters under `param_name`.
///
/// Record fields are emitted in lexicographic order at every level, so the
/// output is deterministic. Sequence elements that are records or sequences
/// themselves get an explicit numeric index segment; scalar elements repeat
/// the unchanged key, producing the flat `key=a&key=b` form. Unset optionals
/// produce no pairs. The output is not percent-encoded; escaping for
/// transport is left to the caller.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Inner {
///     name: String,
///     id: i32,
/// }
///
/// #[derive(Serialize)]
/// struct Query {
///     flag: bool,
///     inner: Inner,
///     tags: Vec<String>,
/// }
///
/// let query = Query {
///     flag: true,
///     inner: Inner {
///         name: "Joe".to_owned(),
///         id: 456,
///     },
///     tags: vec!["new".to_owned(), "sale".to_owned()],
/// };
///
/// assert_eq!(
///     deepobject::encode(&query, "p").unwrap(),
///     "p[flag]=true&p[inner][id]=456&p[inner][name]=Joe&p[tags]=new&p[tags]=sale"
/// );
/// ```
pub fn encode<T: serde::Serialize + ?Sized>(value: &T, param_name: &str) -> Result<String> {
    let Some(root) = tree::to_tree(value)? else {
        return Ok(String::new());
    };
    let mut pairs = Vec::new();
    let mut path = Vec::new();
    walk(&root, param_name, &mut path, &mut pairs);
    log::trace!(
        "encoded {} pairs for parameter `{}`",
        pairs.len(),
        param_name
    );
    Ok(pairs.join("&"))
}

/// Depth-first linearization of the tree into `name<subscript>=value` pairs.
fn walk(value: &Value, param_name: &str, path: &mut Vec<String>, out: &mut Vec<String>) {
    match value {
        Value::Seq(items) => {
            let mut buffer = itoa::Buffer::new();
            for (index, item) in items.iter().enumerate() {
                if item.is_scalar() {
                    // flat repeated form: the path stays as-is
                    walk(item, param_name, path, out);
                } else {
                    // composite elements need an index segment to keep
                    // their fields apart
                    path.push(buffer.format(index).to_owned());
                    walk(item, param_name, path, out);
                    path.pop();
                }
            }
        }
        Value::Record(fields) => {
            for (name, child) in fields {
                path.push(name.clone());
                walk(child, param_name, path, out);
                path.pop();
            }
        }
        Value::Scalar(text) => {
            let subscript = path::encode_path(path);
            let mut pair =
                String::with_capacity(param_name.len() + subscript.len() + 1 + text.len());
            pair.push_str(param_name);
            pair.push_str(&subscript);
            pair.push('=');
            pair.push_str(text);
            out.push(pair);
        }
    }
}
