#![no_main]

use libfuzzer_sys::fuzz_target;
use quill::format::format_source;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Whatever formats must format to itself
        if let Ok(formatted) = format_source(s) {
            let again = format_source(&formatted).expect("formatted output must be valid");
            assert_eq!(formatted, again, "formatting is not idempotent");
        }
    }
});
