#![no_main]

use editml::{IdentityTransform, parse_html};
use libfuzzer_sys::fuzz_target;

// The identity transform must reproduce any valid UTF-8 input byte for byte.
fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let out = parse_html(input, &mut IdentityTransform);
    assert_eq!(out, input);
});
