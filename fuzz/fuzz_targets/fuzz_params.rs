//! Fuzz target: query-string and hex parameter parsers.
//!
//! Feeds arbitrary text through `split_uri`, `parse_hex_u8` and
//! `parse_hex_list` and asserts they never panic and that every parsed
//! byte renders back to a value the parser accepts.
//!
//! cargo fuzz run fuzz_params

#![no_main]

use libfuzzer_sys::fuzz_target;
use wirehub::endpoints::params::{hex, parse_hex_list, parse_hex_u8, split_uri};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let (_, params) = split_uri(text);
    for value in params.values() {
        let _ = parse_hex_u8(value);
    }

    if let Some(bytes) = parse_hex_list(text) {
        for b in bytes {
            assert_eq!(parse_hex_u8(&hex(b)), Some(b), "rendered byte must parse back");
        }
    }
});
