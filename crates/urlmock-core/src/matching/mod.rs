//! Request matching utilities.

pub mod body;
pub mod headers;
pub mod url;

pub use body::bodies_are_equivalent;
pub use headers::{headers_are_equal, headers_are_equal_ignoring};
pub use url::UrlPattern;
