#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // ZIP extraction -> model part discovery -> XML mesh scan -> nested fallback
    let _ = printquote::parser::parse_3mf(data);

    // The XML layer on its own, without an archive around it
    if let Ok(xml) = std::str::from_utf8(data) {
        let _ = printquote::parser::parse_model_xml(xml);
    }
});
