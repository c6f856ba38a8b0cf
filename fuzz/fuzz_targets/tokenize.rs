#![no_main]

use cvl::lexer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = lexer::tokenize("fuzz.cvl", s);
        // The driver re-enters the analyzer; it must report, never panic
        let _ = cvl::compile_source("fuzz.cvl", s);
    }
});
