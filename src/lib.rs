//! deepObject-style query parameters for Serde.
//!
//! The OpenAPI `deepObject` style carries one nested object per query
//! parameter by spelling out the path to every scalar in bracket
//! subscripts:
//!
//! ```text
//! filter[price][max]=100&filter[tags]=new&filter[tags]=sale
//! ```
//!
//! This crate converts between such parameter sets and typed Rust values.
//! Any [`serde::Serialize`] value encodes; destinations implementing
//! [`Assign`] (generated for structs by [`assign_struct!`]) decode in
//! place, so fields without a matching parameter keep their current value.
//! Output is deterministic: record fields are emitted in lexicographic
//! order, and equal values always produce equal strings.
//!
//! ## Usage
//!
//! ```
//! use serde::Serialize;
//!
//! #[derive(Debug, Default, PartialEq, Serialize)]
//! struct Filter {
//!     #[serde(rename = "minPrice")]
//!     min_price: f64,
//!     tags: Vec<String>,
//! }
//!
//! deepobject::assign_struct! {
//!     Filter {
//!         min_price => "minPrice",
//!         tags,
//!     }
//! }
//!
//! let filter = Filter {
//!     min_price: 9.5,
//!     tags: vec!["new".to_owned(), "sale".to_owned()],
//! };
//!
//! let encoded = deepobject::encode(&filter, "filter").unwrap();
//! assert_eq!(
//!     encoded,
//!     "filter[minPrice]=9.5&filter[tags]=new&filter[tags]=sale"
//! );
//!
//! let params = deepobject::parse_query(&encoded).unwrap();
//! let mut decoded = Filter::default();
//! deepobject::decode(&mut decoded, "filter", &params).unwrap();
//! assert_eq!(decoded, filter);
//! ```
//!
//! ## Sequences
//!
//! A sequence of scalars uses the flat repeated form, `p[tags]=a&p[tags]=b`.
//! Sequence elements that are records or sequences themselves get an
//! explicit numeric index segment, e.g. `p[points][0][x]=1`, so sibling
//! fields of different elements stay apart; such sequences decode through a
//! map destination keyed by the index strings.
//!
//! ## Dates and timestamps
//!
//! `chrono::NaiveDate` fields use the `YYYY-MM-DD` grammar.
//! `chrono::DateTime` fields parse RFC 3339 and fall back to a bare date,
//! read as midnight UTC. Types with their own textual grammar implement
//! [`Binder`] and opt in with [`bindable!`].
//!
//! ## Escaping
//!
//! [`encode`] emits raw text and leaves percent-encoding to the transport
//! layer. On the way in, [`parse_query`] undoes
//! `application/x-www-form-urlencoded` escaping before [`decode`] consumes
//! the parameters.

mod config;
mod de;
mod error;
mod path;
mod ser;

pub use config::Config;
pub use de::{Assign, Binder, Node, Params, decode, decode_query, parse_query};
pub use error::{Error, Result};
pub use ser::encode;

#[doc(hidden)]
pub use de::assign::__field_name;
