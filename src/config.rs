use crate::de::{self, Assign, Params};
use crate::error::Result;

/// Configuration for decoding behavior.
///
/// ## Nesting depth
///
/// The `max_depth` parameter bounds the number of bracket segments accepted
/// per parameter. This is important for preventing denial-of-service from
/// maliciously crafted inputs with excessive nesting; deeper parameters fail
/// with a malformed-path error. Encoding is bounded by the value being
/// encoded and takes no configuration.
///
/// Default value: `max_depth = 5`
///
/// ```
/// use std::collections::HashMap;
///
/// use deepobject::Config;
///
/// type Tree = HashMap<String, HashMap<String, HashMap<String, String>>>;
///
/// let params = deepobject::parse_query("p[a][b][c]=1").unwrap();
///
/// let mut strict = Tree::new();
/// let err = Config::new()
///     .max_depth(2)
///     .decode(&mut strict, "p", &params)
///     .unwrap_err();
/// assert!(err.to_string().contains("nesting depth"));
///
/// let mut nested = Tree::new();
/// Config::new()
///     .max_depth(10)
///     .decode(&mut nested, "p", &params)
///     .unwrap();
/// assert_eq!(nested["a"]["b"]["c"], "1");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Maximum number of bracket segments accepted per parameter on decode.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self { max_depth: 5 }
    }

    /// Sets the maximum nesting depth accepted when decoding. Default is 5.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decodes the deepObject parameters of `param_name` into `dst` using
    /// this `Config`.
    pub fn decode<T: Assign>(self, dst: &mut T, param_name: &str, params: &Params) -> Result<()> {
        de::decode_with(self, dst, param_name, params)
    }

    /// Parses `query` with [`parse_query`](crate::parse_query) and decodes
    /// `param_name` from it using this `Config`.
    pub fn decode_query<T: Assign>(self, dst: &mut T, param_name: &str, query: &str) -> Result<()> {
        let params = de::parse_query(query)?;
        self.decode(dst, param_name, &params)
    }
}
