//! PIN lock state machine.
//!
//! The gate collects digits one at a time, like a keypad, and decides what a
//! complete four-digit input means in the current mode:
//!
//! ```text
//! Idle --start(Start)--> VerifyStart    (stored PIN exists; cannot be cancelled)
//! Idle --start(Set)----> SetNew1        (no stored PIN)
//! Idle --start(Disable)-> DisableVerify (stored PIN exists)
//!
//! VerifyStart   + match    -> Idle, Unlocked
//! DisableVerify + match    -> Idle, PinCleared
//! SetNew1       + any      -> SetNew2, AwaitConfirmation
//! SetNew2       + same     -> Idle, PinSet
//! SetNew2       + other    -> SetNew1, Mismatch
//! any verify    + no match -> same mode, Rejected
//! ```
//!
//! [`Gate::press`] is pure; [`Gate::enter_digit`] additionally writes the
//! outcome through the repository. The `prompt` submodule drives a whole flow
//! from a terminal or the `DREAMLOG_PIN` variable.

pub mod prompt;

use crate::constants::PIN_LENGTH;
use crate::errors::{AppError, AppResult};
use crate::storage::Repository;
use std::fmt;
use tracing::{debug, info};
use zeroize::{Zeroize, Zeroizing};

/// Where the gate is in a PIN flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    Idle,
    VerifyStart,
    DisableVerify,
    SetNew1,
    SetNew2,
}

/// What the user asked the gate to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRequest {
    /// Unlock at launch.
    Start,
    /// Turn the lock on.
    Set,
    /// Turn the lock off.
    Disable,
}

/// Result of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// Fewer than four digits so far.
    Pending,
    Unlocked,
    /// The stored PIN should be removed.
    PinCleared,
    /// First PIN of the set flow accepted; enter it again.
    AwaitConfirmation,
    /// The confirmed new PIN, to be stored.
    PinSet(String),
    /// Wrong PIN; input was cleared.
    Rejected,
    /// Confirmation differed from the first entry; back to `SetNew1`.
    Mismatch,
}

/// The PIN state machine. Digit buffers are wiped whenever they are cleared
/// and when the gate is dropped.
pub struct Gate {
    mode: GateMode,
    temp_pin: Zeroizing<String>,
    current_input: Zeroizing<String>,
    unlocked: bool,
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("mode", &self.mode)
            .field("input_len", &self.current_input.len())
            .field("unlocked", &self.unlocked)
            .finish()
    }
}

/// An idle, still locked gate; used to run the set and disable flows.
impl Default for Gate {
    fn default() -> Self {
        Gate {
            mode: GateMode::Idle,
            temp_pin: Zeroizing::new(String::new()),
            current_input: Zeroizing::new(String::new()),
            unlocked: false,
        }
    }
}

impl Gate {
    /// A gate for a session whose stored PIN is `stored`: locked in
    /// `VerifyStart` when a PIN exists, open otherwise.
    pub fn at_launch(stored: Option<&str>) -> Self {
        match stored {
            Some(_) => Gate {
                mode: GateMode::VerifyStart,
                ..Gate::default()
            },
            None => Gate {
                unlocked: true,
                ..Gate::default()
            },
        }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Number of digits entered so far.
    pub fn input_len(&self) -> usize {
        self.current_input.len()
    }

    /// Starts a flow.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the request does not fit the
    /// stored PIN (setting a PIN that exists, disabling one that does not)
    /// or another flow is in progress.
    pub fn start(&mut self, request: GateRequest, stored: Option<&str>) -> AppResult<()> {
        if self.mode != GateMode::Idle {
            return Err(AppError::Validation(
                "A PIN flow is already in progress".to_string(),
            ));
        }

        self.mode = match (request, stored.is_some()) {
            (GateRequest::Start, true) => {
                self.unlocked = false;
                GateMode::VerifyStart
            }
            (GateRequest::Set, false) => GateMode::SetNew1,
            (GateRequest::Disable, true) => GateMode::DisableVerify,
            (GateRequest::Start, false) => {
                self.unlocked = true;
                return Ok(());
            }
            (GateRequest::Set, true) => {
                return Err(AppError::Validation(
                    "A PIN is already set; disable it first".to_string(),
                ))
            }
            (GateRequest::Disable, false) => {
                return Err(AppError::Validation("No PIN is set".to_string()))
            }
        };
        self.clear_input();
        debug!("PIN flow started in {:?}", self.mode);
        Ok(())
    }

    /// Adds one digit and evaluates the input once it is complete.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a non-digit or when no flow is active.
    pub fn press(&mut self, digit: char, stored: Option<&str>) -> AppResult<GateEvent> {
        if self.mode == GateMode::Idle {
            return Err(AppError::Validation(
                "No PIN entry in progress".to_string(),
            ));
        }
        if !digit.is_ascii_digit() {
            return Err(AppError::Validation(format!(
                "'{}' is not a digit",
                digit
            )));
        }

        self.current_input.push(digit);
        if self.current_input.len() < PIN_LENGTH {
            return Ok(GateEvent::Pending);
        }

        let input = Zeroizing::new(self.current_input.as_str().to_string());
        self.clear_input();

        let event = match self.mode {
            GateMode::VerifyStart => match stored {
                Some(pin) if pin != input.as_str() => GateEvent::Rejected,
                _ => {
                    self.mode = GateMode::Idle;
                    self.unlocked = true;
                    GateEvent::Unlocked
                }
            },
            GateMode::DisableVerify => match stored {
                Some(pin) if pin == input.as_str() => {
                    self.mode = GateMode::Idle;
                    GateEvent::PinCleared
                }
                _ => GateEvent::Rejected,
            },
            GateMode::SetNew1 => {
                self.temp_pin = input;
                self.mode = GateMode::SetNew2;
                GateEvent::AwaitConfirmation
            }
            GateMode::SetNew2 => {
                if self.temp_pin.as_str() == input.as_str() {
                    self.temp_pin.zeroize();
                    self.mode = GateMode::Idle;
                    GateEvent::PinSet(input.as_str().to_string())
                } else {
                    self.temp_pin.zeroize();
                    self.mode = GateMode::SetNew1;
                    GateEvent::Mismatch
                }
            }
            GateMode::Idle => GateEvent::Pending,
        };

        debug!("PIN input evaluated: {:?}", redacted(&event));
        Ok(event)
    }

    /// Like [`Gate::press`], reading the stored PIN from `repo` and writing
    /// any change back.
    ///
    /// If the write fails the flow is abandoned and the stored PIN is
    /// whatever it was before.
    pub fn enter_digit(&mut self, repo: &Repository, digit: char) -> AppResult<GateEvent> {
        let stored = repo.load_pin();
        let event = self.press(digit, stored.as_deref())?;

        let persisted = match &event {
            GateEvent::PinSet(pin) => repo.save_pin(pin),
            GateEvent::PinCleared => repo.clear_pin(),
            _ => Ok(()),
        };
        if let Err(e) = persisted {
            self.reset();
            return Err(e);
        }

        match event {
            GateEvent::PinSet(_) => info!("PIN lock enabled"),
            GateEvent::PinCleared => info!("PIN lock disabled"),
            _ => {}
        }
        Ok(event)
    }

    /// Removes the last digit, if any.
    pub fn backspace(&mut self) {
        self.current_input.pop();
    }

    /// Leaves the current flow. Refused while verifying at launch.
    pub fn cancel(&mut self) -> bool {
        if self.mode == GateMode::VerifyStart {
            return false;
        }
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.mode = GateMode::Idle;
        self.temp_pin.zeroize();
        self.clear_input();
    }

    fn clear_input(&mut self) {
        self.current_input.zeroize();
    }
}

/// Keeps new PINs out of debug logs.
fn redacted(event: &GateEvent) -> GateEvent {
    match event {
        GateEvent::PinSet(_) => GateEvent::PinSet("****".to_string()),
        other => other.clone(),
    }
}
