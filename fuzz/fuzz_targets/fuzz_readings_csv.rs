#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either resolve to rows or fail with an error.
    if let Ok(csv) = thermo_config::read_readings(data) {
        for row in &csv.rows {
            if let Some(t) = row.temperature {
                assert!(!t.is_nan());
            }
        }
    }
});
