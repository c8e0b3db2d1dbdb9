#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = thermo_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // a valid config always carries usable horizons
            assert!(thermo_config::validate_horizons(&cfg.forecast.horizons).is_ok());
        }
    }
});
