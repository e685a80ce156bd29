//! Building URLs with URL-encoded query parameters.

use crate::encoding::{url_encoded_string_for_parameters, ParamMap};
use crate::error::MockError;
use url::Url;

fn append_query(mut url: Url, params: &ParamMap) -> Url {
    let encoded = url_encoded_string_for_parameters(params);
    if encoded.is_empty() {
        return url;
    }

    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded,
    };
    url.set_query(Some(&query));
    url
}

/// Parse `url` and append the parameters as its query string.
pub fn url_with_parameters(url: &str, params: &ParamMap) -> Result<Url, MockError> {
    let parsed = Url::parse(url).map_err(|source| MockError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    Ok(append_query(parsed, params))
}

/// Resolve `url` against `base` and append the parameters as its query string.
pub fn url_with_parameters_relative_to(
    base: &Url,
    url: &str,
    params: &ParamMap,
) -> Result<Url, MockError> {
    let joined = base.join(url).map_err(|source| MockError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    Ok(append_query(joined, params))
}
