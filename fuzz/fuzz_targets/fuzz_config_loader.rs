#![no_main]
use libfuzzer_sys::fuzz_target;
use repcount_core::{DetectorConfig, MovementCfg, RepDetector};

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let Ok(cfg) = repcount_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // A validated config must also pass the detector builder.
    let movement = MovementCfg::from(&cfg.movement);
    for profile in cfg.profiles() {
        let built = RepDetector::builder()
            .config(DetectorConfig::from(&profile))
            .movement(movement.clone())
            .try_build();
        assert!(built.is_ok(), "validated profile {} failed to build", profile.name);
    }
});
