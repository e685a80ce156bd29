//! Helpers for tests that use mock protocols.

pub mod counting;
pub mod random;
pub mod wait;

pub use counting::{ClientMessage, MessageCountingClient};
pub use random::{
    random_alphanumeric_string, random_alphanumeric_string_with_length, random_bool, random_json,
    random_string_map, random_unicode_string, random_unicode_string_with_length, random_unsigned,
    random_unsigned_in_range,
};
pub use wait::wait_for_condition;
