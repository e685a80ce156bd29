//! Random values for tests.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::ops::{Range, RangeInclusive};

const MAX_RANDOM_STRING_LENGTH: usize = 128;

/// Basic Latin, Latin-1 Supplement, Greek and Coptic, Cyrillic, Hebrew, Arabic,
/// Devanagari, Hiragana, Katakana
const UNICODE_BLOCKS: [RangeInclusive<u32>; 9] = [
    0x0020..=0x007E,
    0x00A1..=0x00FF,
    0x0370..=0x03FF,
    0x0400..=0x04FF,
    0x0590..=0x05FF,
    0x0600..=0x06FF,
    0x0900..=0x097F,
    0x3040..=0x309F,
    0x30A0..=0x30FF,
];

fn random_length() -> usize {
    rand::thread_rng().gen_range(1..=MAX_RANDOM_STRING_LENGTH)
}

/// Alphanumeric string of 1 to 128 characters.
pub fn random_alphanumeric_string() -> String {
    random_alphanumeric_string_with_length(random_length())
}

pub fn random_alphanumeric_string_with_length(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// String of 1 to 128 characters drawn from several Unicode blocks.
pub fn random_unicode_string() -> String {
    random_unicode_string_with_length(random_length())
}

pub fn random_unicode_string_with_length(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let block = &UNICODE_BLOCKS[rng.gen_range(0..UNICODE_BLOCKS.len())];
            let code_point = rng.gen_range(block.clone());
            char::from_u32(code_point).unwrap_or('?')
        })
        .collect()
}

pub fn random_bool() -> bool {
    rand::thread_rng().gen()
}

pub fn random_unsigned() -> u64 {
    rand::thread_rng().gen()
}

/// Value in `range`, or `range.start` when the range is empty.
pub fn random_unsigned_in_range(range: Range<u64>) -> u64 {
    if range.is_empty() {
        return range.start;
    }
    rand::thread_rng().gen_range(range)
}

/// Map with `count` random alphanumeric keys and Unicode values.
pub fn random_string_map(count: usize) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(count);
    while map.len() < count {
        map.insert(random_alphanumeric_string(), random_unicode_string());
    }
    map
}

fn random_scalar() -> Value {
    let mut rng = rand::thread_rng();
    match rng.gen_range(0..4) {
        0 => Value::Null,
        1 => Value::Bool(rng.gen()),
        2 => Value::Number(Number::from(rng.gen::<u32>())),
        _ => Value::String(random_unicode_string()),
    }
}

/// Random JSON value.
///
/// `max_nesting_depth` counts every level including the innermost scalar, so a depth
/// of 1 always gives a scalar. Collections hold at most `max_elements_per_collection` values.
pub fn random_json(max_nesting_depth: usize, max_elements_per_collection: usize) -> Value {
    let mut rng = rand::thread_rng();
    if max_nesting_depth <= 1 || max_elements_per_collection == 0 {
        return random_scalar();
    }

    let count = rng.gen_range(0..=max_elements_per_collection);
    let depth = max_nesting_depth - 1;
    match rng.gen_range(0..3) {
        0 => Value::Array(
            (0..count)
                .map(|_| random_json(depth, max_elements_per_collection))
                .collect(),
        ),
        1 => {
            let mut map = Map::new();
            for _ in 0..count {
                map.insert(
                    random_alphanumeric_string(),
                    random_json(depth, max_elements_per_collection),
                );
            }
            Value::Object(map)
        }
        _ => random_scalar(),
    }
}
