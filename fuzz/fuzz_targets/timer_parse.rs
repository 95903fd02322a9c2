#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use padlock_core::{LockVariant, ValidationError, timer};

fuzz_target!(|input: (&str, u8, Option<u32>)| {
    let (text, variant, limit) = input;

    // Anything parsed renders back to the same duration
    if let Ok(duration) = timer::parse_timer(text) {
        assert!(duration > Duration::ZERO);
        let rendered = timer::format_timer(duration);
        assert_eq!(timer::parse_timer(&rendered), Ok(duration));
    }

    let variant = LockVariant::ALL[usize::from(variant) % LockVariant::ALL.len()];
    let limit = limit.map(|secs| Duration::from_secs(u64::from(secs)));
    match padlock_core::validate::validate_lock(variant, text, text, limit) {
        Ok(credentials) => {
            assert_eq!(credentials.password.is_some(), variant.requires_password());
            assert_eq!(credentials.timer.is_some(), variant.requires_timer());
            if let (Some(timer), Some(limit)) = (credentials.timer, limit) {
                assert!(timer <= limit);
            }
        },
        Err(ValidationError::NoLockSelected) => assert_eq!(variant, LockVariant::None),
        Err(_) => {},
    }
});
