#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(geometry) = printquote::parser::parse_obj(data) {
        let _ = geometry.volume_cm3();
    }
});
