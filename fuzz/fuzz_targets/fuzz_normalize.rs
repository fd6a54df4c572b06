#![no_main]
use libfuzzer_sys::fuzz_target;
use license_normalizer::{LicenseNormalizer, ValidationMode, ValidationModes};
use std::sync::OnceLock;

static NORMALIZER: OnceLock<LicenseNormalizer> = OnceLock::new();

/// Fuzz the full normalization pipeline.
///
/// Runs every pass plus all validation modes; any input may fail, none may
/// panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let normalizer = NORMALIZER
            .get_or_init(|| LicenseNormalizer::builtin().expect("builtin definitions load"));
        let all: ValidationModes = [
            ValidationMode::Relaxed,
            ValidationMode::Spdx,
            ValidationMode::Scancode,
            ValidationMode::Osadl,
        ]
        .into_iter()
        .collect();
        let _ = normalizer.normalize(s, &ValidationModes::none(), true);
        let _ = normalizer.normalize(s, &all, false);
        let _ = normalizer.resolve_compatibility(s, &ValidationModes::none(), true);
    }
});
