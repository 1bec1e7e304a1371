#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Both the binary and the ASCII path, depending on byte 80
    if let Ok(mesh) = printquote::parser::parse_stl(data) {
        let _ = printquote::mesh_ops::compute_mesh_volume_cm3(&mesh);
    }
});
