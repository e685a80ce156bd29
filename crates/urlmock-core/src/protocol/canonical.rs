//! Canonical URLs used for exact request matching.

use crate::encoding::{dictionary_for_url_encoded_parameters_string, url_encoded_string_for_parameters};
use url::Url;

/// Normalise a URL so equivalent spellings compare equal.
///
/// Parsing already lowercases the scheme and host, drops default ports, and turns an empty
/// path into `/`. On top of that the fragment is dropped and a parseable query is
/// re-encoded with its keys sorted. A query that does not parse is kept as is.
pub fn canonical_url_for_url(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);

    let Some(query) = canonical.query().map(str::to_owned) else {
        return canonical;
    };

    if let Some(params) = dictionary_for_url_encoded_parameters_string(&query) {
        let encoded = url_encoded_string_for_parameters(&params);
        if encoded.is_empty() {
            canonical.set_query(None);
        } else {
            canonical.set_query(Some(&encoded));
        }
    }
    canonical
}
