//! Padlock variants and their input requirements.
//!
//! Every padlock kind carries static metadata describing which inputs the
//! user has to supply to apply it (and to remove it again). The field layout
//! helpers turn that metadata into the concrete input fields a renderer
//! should show.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exact length of a combination padlock code.
pub const COMBINATION_LEN: usize = 4;

/// Byte cap for password input.
pub const PASSWORD_MAX_LEN: usize = 20;

/// Byte cap for timer input.
pub const TIMER_MAX_LEN: usize = 12;

/// Kind of padlock that can be applied to a lockable item.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LockVariant {
    /// No padlock.
    #[default]
    None,
    /// Four digit combination.
    Combination,
    /// Free-form password.
    Password,
    /// Password that also expires after a timer.
    TimerPassword,
    /// Expires after a timer.
    Timer,
    /// Timer lock that only the owner may apply.
    OwnerTimer,
    /// Timer lock that only the assigner may remove.
    DevotionalTimer,
}

/// Which inputs a variant needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRequirements {
    /// A password (or combination) is required.
    pub needs_password: bool,
    /// A timer is required.
    pub needs_timer: bool,
    /// The lock combo needs a second row for its input fields.
    pub is_two_row: bool,
}

impl LockVariant {
    /// Every variant, in display order.
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Combination,
        Self::Password,
        Self::TimerPassword,
        Self::Timer,
        Self::OwnerTimer,
        Self::DevotionalTimer,
    ];

    /// Human readable name shown in combo boxes.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Combination => "Combination Padlock",
            Self::Password => "Password Padlock",
            Self::TimerPassword => "Timer Password Padlock",
            Self::Timer => "Timer Padlock",
            Self::OwnerTimer => "Owner Timer Padlock",
            Self::DevotionalTimer => "Devotional Timer Padlock",
        }
    }

    /// Whether applying or removing this padlock needs a password.
    pub fn requires_password(self) -> bool {
        matches!(self, Self::Combination | Self::Password | Self::TimerPassword)
    }

    /// Whether applying this padlock needs a timer.
    pub fn requires_timer(self) -> bool {
        matches!(self, Self::TimerPassword | Self::Timer | Self::OwnerTimer | Self::DevotionalTimer)
    }

    /// Whether the lock combo needs a second row for input fields.
    pub fn is_two_row(self) -> bool {
        self != Self::None
    }

    /// Byte cap of the password field for this variant.
    pub fn password_max_len(self) -> usize {
        if self == Self::Combination { COMBINATION_LEN } else { PASSWORD_MAX_LEN }
    }

    /// Byte cap of the timer field.
    pub fn timer_max_len(self) -> usize {
        TIMER_MAX_LEN
    }

    /// Inputs required by this variant.
    pub fn requirements(self) -> FieldRequirements {
        FieldRequirements {
            needs_password: self.requires_password(),
            needs_timer: self.requires_timer(),
            is_two_row: self.is_two_row(),
        }
    }

    /// Input fields shown while this variant is selected for locking.
    pub fn lock_fields(self) -> FieldLayout {
        match self {
            Self::None => FieldLayout::Hidden,
            Self::Combination => FieldLayout::Single(InputField::COMBINATION),
            Self::Password => FieldLayout::Single(InputField::PASSWORD),
            Self::TimerPassword => {
                FieldLayout::Stacked { password: InputField::PASSWORD, timer: InputField::TIMER }
            },
            Self::Timer | Self::OwnerTimer | Self::DevotionalTimer => {
                FieldLayout::Single(InputField::TIMER)
            },
        }
    }

    /// Input fields shown while this variant is the active padlock.
    ///
    /// Only password locks ask for input on removal; timers cannot be
    /// entered to unlock.
    pub fn unlock_fields(self) -> FieldLayout {
        match self {
            Self::Combination => FieldLayout::Single(InputField::COMBINATION),
            Self::Password | Self::TimerPassword => FieldLayout::Single(InputField::PASSWORD),
            Self::None | Self::Timer | Self::OwnerTimer | Self::DevotionalTimer => {
                FieldLayout::Hidden
            },
        }
    }
}

impl fmt::Display for LockVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which edit buffer an input field writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Password or combination text.
    Password,
    /// Timer text.
    Timer,
}

/// A single text input a renderer must show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputField {
    /// Buffer the field edits.
    pub kind: FieldKind,
    /// Field id, scoped by the owning widget's label when rendered.
    pub id: &'static str,
    /// Placeholder shown while the field is empty.
    pub hint: &'static str,
    /// Byte-length cap of the field.
    pub max_len: usize,
}

impl InputField {
    /// Four digit combination input.
    pub const COMBINATION: Self = Self {
        kind: FieldKind::Password,
        id: "Combination_Input",
        hint: "Enter 4 digit combination...",
        max_len: COMBINATION_LEN,
    };

    /// Password input.
    pub const PASSWORD: Self = Self {
        kind: FieldKind::Password,
        id: "Password_Input",
        hint: "Enter password...",
        max_len: PASSWORD_MAX_LEN,
    };

    /// Timer input.
    pub const TIMER: Self = Self {
        kind: FieldKind::Timer,
        id: "Timer_Input",
        hint: "Ex: 0h2m7s",
        max_len: TIMER_MAX_LEN,
    };
}

/// Arrangement of input fields under a padlock combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// No input fields.
    Hidden,
    /// One input field.
    Single(InputField),
    /// Password and timer inputs sharing one row.
    Stacked {
        /// Password input.
        password: InputField,
        /// Timer input.
        timer: InputField,
    },
}

impl FieldLayout {
    /// Fields in render order.
    pub fn fields(&self) -> Vec<InputField> {
        match *self {
            Self::Hidden => Vec::new(),
            Self::Single(field) => vec![field],
            Self::Stacked { password, timer } => vec![password, timer],
        }
    }

    /// Number of fields to render.
    pub fn field_count(&self) -> usize {
        match self {
            Self::Hidden => 0,
            Self::Single(_) => 1,
            Self::Stacked { .. } => 2,
        }
    }
}
