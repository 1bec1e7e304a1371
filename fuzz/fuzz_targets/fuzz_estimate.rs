#![no_main]

use libfuzzer_sys::fuzz_target;
use printquote::{PrintSettings, estimate_print};

fuzz_target!(|data: &[u8]| {
    // Every readable or unreadable upload must quote without panicking
    let settings = PrintSettings::new();
    for filename in ["upload.stl", "upload.obj", "upload.3mf"] {
        if let Err(e) = estimate_print(filename, data, &settings) {
            assert!(
                matches!(e, printquote::Error::EstimationFailed(_)),
                "unexpected error for {}: {}",
                filename,
                e
            );
        }
    }
});
