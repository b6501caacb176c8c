//! Fuzz target for plan parsing.
//!
//! Arbitrary JSON text must either parse into a plan or fail with an
//! error, and a parsed plan must survive a pre-flight check.

#![no_main]

use libfuzzer_sys::fuzz_target;
use remold::{PipelinePlan, TransformEngine};

fuzz_target!(|data: &[u8]| {
    if data.len() > 64_000 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(plan) = PipelinePlan::from_json_str(text) {
        let _ = TransformEngine::default().check(&plan);
    }
});
