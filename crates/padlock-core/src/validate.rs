//! Local validation of lock and unlock input.
//!
//! Validation only checks shape: presence, byte caps, combination digits,
//! timer syntax and limits. Whether a password is the right one is for the
//! peer to decide.

use std::time::Duration;

use crate::{
    error::ValidationError,
    request::Credentials,
    timer::parse_timer,
    variant::{COMBINATION_LEN, LockVariant},
};

/// Validate input for applying `variant`.
///
/// Only the inputs the variant requires end up in the returned credentials;
/// anything else typed into the buffer is ignored.
pub fn validate_lock(
    variant: LockVariant,
    password: &str,
    timer: &str,
    limit: Option<Duration>,
) -> Result<Credentials, ValidationError> {
    if variant == LockVariant::None {
        return Err(ValidationError::NoLockSelected);
    }

    let password =
        if variant.requires_password() { Some(check_password(variant, password)?) } else { None };
    let timer =
        if variant.requires_timer() { Some(check_timer(variant, timer, limit)?) } else { None };

    Ok(Credentials { password, timer })
}

/// Validate input for removing the active padlock `variant`.
pub fn validate_unlock(
    variant: LockVariant,
    password: &str,
) -> Result<Credentials, ValidationError> {
    if variant == LockVariant::None {
        return Err(ValidationError::NotLocked);
    }

    let password =
        if variant.requires_password() { Some(check_password(variant, password)?) } else { None };

    Ok(Credentials { password, timer: None })
}

fn check_password(variant: LockVariant, password: &str) -> Result<String, ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingPassword { variant });
    }

    let max = variant.password_max_len();
    if password.len() > max {
        return Err(ValidationError::PasswordTooLong { len: password.len(), max });
    }

    if variant == LockVariant::Combination
        && (password.len() != COMBINATION_LEN || !password.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(ValidationError::MalformedCombination);
    }

    Ok(password.to_string())
}

fn check_timer(
    variant: LockVariant,
    timer: &str,
    limit: Option<Duration>,
) -> Result<Duration, ValidationError> {
    if timer.trim().is_empty() {
        return Err(ValidationError::MissingTimer { variant });
    }

    let max = variant.timer_max_len();
    if timer.len() > max {
        return Err(ValidationError::TimerTooLong { len: timer.len(), max });
    }

    let requested = parse_timer(timer)?;
    match limit {
        Some(limit) if requested > limit => {
            Err(ValidationError::TimerExceedsLimit { requested, limit })
        },
        _ => Ok(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_needs_four_digits() {
        assert!(validate_lock(LockVariant::Combination, "1234", "", None).is_ok());
        assert_eq!(
            validate_lock(LockVariant::Combination, "12a4", "", None),
            Err(ValidationError::MalformedCombination)
        );
        assert_eq!(
            validate_lock(LockVariant::Combination, "123", "", None),
            Err(ValidationError::MalformedCombination)
        );
        assert_eq!(
            validate_lock(LockVariant::Combination, "12345", "", None),
            Err(ValidationError::PasswordTooLong { len: 5, max: 4 })
        );
    }

    #[test]
    fn password_only_carries_password() {
        let creds = validate_lock(LockVariant::Password, "secret", "1h", None).unwrap();
        assert_eq!(creds, Credentials { password: Some("secret".to_string()), timer: None });
    }

    #[test]
    fn timer_only_carries_timer() {
        let creds = validate_lock(LockVariant::Timer, "ignored", "2m7s", None).unwrap();
        assert_eq!(creds, Credentials { password: None, timer: Some(Duration::from_secs(127)) });
    }

    #[test]
    fn timer_password_validates_both() {
        assert_eq!(
            validate_lock(LockVariant::TimerPassword, "", "1h", None),
            Err(ValidationError::MissingPassword { variant: LockVariant::TimerPassword })
        );
        assert_eq!(
            validate_lock(LockVariant::TimerPassword, "pw", "", None),
            Err(ValidationError::MissingTimer { variant: LockVariant::TimerPassword })
        );
    }

    #[test]
    fn oversized_inputs_rejected() {
        let long = "x".repeat(21);
        assert_eq!(
            validate_lock(LockVariant::Password, &long, "", None),
            Err(ValidationError::PasswordTooLong { len: 21, max: 20 })
        );
        assert_eq!(
            validate_lock(LockVariant::Timer, "", "1h1m1s1111111", None),
            Err(ValidationError::TimerTooLong { len: 13, max: 12 })
        );
    }

    #[test]
    fn timer_limit_enforced() {
        let limit = Some(Duration::from_secs(3600));
        assert!(validate_lock(LockVariant::OwnerTimer, "", "59m", limit).is_ok());
        assert_eq!(
            validate_lock(LockVariant::OwnerTimer, "", "1h1s", limit),
            Err(ValidationError::TimerExceedsLimit {
                requested: Duration::from_secs(3601),
                limit: Duration::from_secs(3600),
            })
        );
    }

    #[test]
    fn unlock_of_timer_lock_needs_nothing() {
        let creds = validate_unlock(LockVariant::DevotionalTimer, "").unwrap();
        assert_eq!(creds, Credentials::default());
    }

    #[test]
    fn unlock_of_unlocked_item_rejected() {
        assert_eq!(validate_unlock(LockVariant::None, "pw"), Err(ValidationError::NotLocked));
    }

    #[test]
    fn none_is_never_valid_for_lock() {
        assert_eq!(
            validate_lock(LockVariant::None, "pw", "1h", None),
            Err(ValidationError::NoLockSelected)
        );
    }
}
