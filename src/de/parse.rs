//! Query-string ingest.

use percent_encoding::percent_decode;

use crate::de::Params;
use crate::error::Result;

/// Parses a raw query string into [`Params`] following the
/// `application/x-www-form-urlencoded` conventions: pairs split on `&`, the
/// first `=` separates key from value (a bare key yields the empty value),
/// `+` is a space, and percent-escapes are decoded. Repeated keys accumulate
/// their values in order.
///
/// This is the one place the crate touches transport escaping;
/// [`decode`](crate::decode) itself consumes already-decoded [`Params`].
///
/// ```
/// let params = deepobject::parse_query("p[name]=Joe+Schmoe&p[tags]=a&p[tags]=b%21").unwrap();
/// assert_eq!(params["p[name]"], vec!["Joe Schmoe"]);
/// assert_eq!(params["p[tags]"], vec!["a", "b!"]);
/// ```
pub fn parse_query(input: &str) -> Result<Params> {
    let mut params = Params::new();
    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        params
            .entry(decode_component(key)?)
            .or_default()
            .push(decode_component(value)?);
    }
    Ok(params)
}

/// Undoes form escaping on one component: `+` becomes a space before
/// percent-decoding, and the decoded bytes must be valid UTF-8.
fn decode_component(raw: &str) -> Result<String> {
    if !raw.contains(['+', '%']) {
        return Ok(raw.to_owned());
    }
    let spaced = raw.replace('+', " ");
    let decoded = percent_decode(spaced.as_bytes()).decode_utf8()?;
    Ok(decoded.into_owned())
}
