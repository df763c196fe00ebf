//! Unified error types for the barbot firmware.
//!
//! Every rejection the pour path can produce is a small `Copy` enum so it
//! can be returned to the interactive surface, logged, and carried inside
//! a [`PourOutcome`](crate::engine::PourOutcome) without allocation.

use core::fmt;

use crate::drivers::pump::PumpMode;
use crate::recipe::Channel;

// ---------------------------------------------------------------------------
// Pour request errors
// ---------------------------------------------------------------------------

/// Why a pour request (or manual command) was not carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PourError {
    /// The recipe failed validation; nothing was actuated.
    InvalidRecipe(RecipeError),
    /// The request arrived inside the debounce window.
    DebounceRejected,
    /// Another pour session is still running.
    SessionBusy,
    /// A manual pump command arrived while a pour session is running.
    ManualBlocked,
    /// The drink is not present in the selected menu.
    UnknownDrink,
    /// No menu at this index in the catalog.
    UnknownMenu(usize),
    /// The pour worker thread could not be created.
    SpawnFailed,
    /// A manual command addressed a channel the driver rejected.
    Driver(DriverFault),
}

impl PourError {
    /// Rejections the interactive surface may silently ignore.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::DebounceRejected | Self::SessionBusy)
    }
}

impl fmt::Display for PourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRecipe(e) => write!(f, "invalid recipe: {e}"),
            Self::DebounceRejected => write!(f, "request inside debounce window"),
            Self::SessionBusy => write!(f, "a pour is already in progress"),
            Self::ManualBlocked => write!(f, "manual control blocked during a pour"),
            Self::UnknownDrink => write!(f, "drink not found in menu"),
            Self::UnknownMenu(i) => write!(f, "no menu at index {i}"),
            Self::SpawnFailed => write!(f, "pour worker could not be started"),
            Self::Driver(e) => write!(f, "driver: {e}"),
        }
    }
}

impl From<RecipeError> for PourError {
    fn from(e: RecipeError) -> Self {
        Self::InvalidRecipe(e)
    }
}

impl From<DriverFault> for PourError {
    fn from(e: DriverFault) -> Self {
        Self::Driver(e)
    }
}

// ---------------------------------------------------------------------------
// Recipe validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeError {
    /// Recipe length differs from the configured channel count.
    WrongLength { expected: u8, actual: usize },
    /// An entry is negative (or not a finite number). Index is 0-based.
    NegativeEntry { index: usize },
    /// Scale factor must be a positive finite number.
    BadScale,
}

impl fmt::Display for RecipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { expected, actual } => {
                write!(f, "expected {expected} entries, got {actual}")
            }
            Self::NegativeEntry { index } => {
                write!(f, "entry for channel {} is negative", index + 1)
            }
            Self::BadScale => write!(f, "scale factor must be positive"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator driver faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Channel number outside `1..=channel_count`.
    NoSuchChannel,
    /// A relay output line could not be written.
    GpioWriteFailed,
    /// The driver refused the command (injected or hardware-reported).
    Rejected,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchChannel => write!(f, "no such channel"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::Rejected => write!(f, "command rejected"),
        }
    }
}

/// A single failed `set_state` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverFault {
    pub channel: Channel,
    pub mode: PumpMode,
    pub kind: FaultKind,
}

impl DriverFault {
    pub const fn new(channel: Channel, mode: PumpMode, kind: FaultKind) -> Self {
        Self {
            channel,
            mode,
            kind,
        }
    }
}

impl fmt::Display for DriverFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pump {} -> {:?}: {}", self.channel, self.mode, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The config document could not be parsed.
    Malformed,
    /// A field failed range validation. The `&'static str` names it.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config document malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog document is not valid JSON of the expected shape.
    Malformed,
    /// The document contains no menus.
    Empty,
    /// Menu index out of range.
    NoSuchMenu(usize),
    /// Drink name not present in the menu.
    NoSuchDrink,
    /// A drink's recipe failed validation.
    Recipe(RecipeError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "catalog malformed"),
            Self::Empty => write!(f, "catalog has no menus"),
            Self::NoSuchMenu(i) => write!(f, "no menu at index {i}"),
            Self::NoSuchDrink => write!(f, "no such drink"),
            Self::Recipe(e) => write!(f, "recipe: {e}"),
        }
    }
}

impl From<RecipeError> for CatalogError {
    fn from(e: RecipeError) -> Self {
        Self::Recipe(e)
    }
}

impl From<CatalogError> for PourError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Recipe(r) => Self::InvalidRecipe(r),
            CatalogError::NoSuchMenu(i) => Self::UnknownMenu(i),
            _ => Self::UnknownDrink,
        }
    }
}

impl std::error::Error for PourError {}
impl std::error::Error for RecipeError {}
impl std::error::Error for DriverFault {}
impl std::error::Error for ConfigError {}
impl std::error::Error for CatalogError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Pour-path `Result` alias.
pub type Result<T> = core::result::Result<T, PourError>;
