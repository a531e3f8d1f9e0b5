#![no_main]

use concolic_sym::PredefinedConstraints;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(constraints) = PredefinedConstraints::parse(text) {
            for (name, expressions) in constraints.iter() {
                assert!(!name.is_empty());
                assert!(expressions.iter().all(|e| !e.is_empty()));
            }
        }
    }
});
