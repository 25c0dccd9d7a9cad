//! GPIO register report.
//!
//! Decodes the function select, pin level and event detect registers of
//! every GPIO line and formats one line of text per pin.

use std::{fmt, iter::FusedIterator};

use crate::regs::{
    gpeds, gpfsel, gplev, RegisterSpace, BIT_PINS_PER_REG, FSEL_BITS, FSEL_PINS_PER_REG, GPIO_COUNT,
};

/// Pin function as encoded in a function select register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// 0b000
    Input,
    /// 0b001
    Output,
    /// 0b010
    Alt5,
    /// 0b011
    Alt4,
    /// 0b100
    Alt0,
    /// 0b101
    Alt1,
    /// 0b110
    Alt2,
    /// 0b111
    Alt3,
}

impl Function {
    /// Decoding table, indexed by the 3-bit field value.
    const TABLE: [Self; 8] =
        [Self::Input, Self::Output, Self::Alt5, Self::Alt4, Self::Alt0, Self::Alt1, Self::Alt2, Self::Alt3];

    /// Decodes the low 3 bits of `bits`.
    pub const fn from_bits(bits: u32) -> Self {
        Self::TABLE[(bits & 0b111) as usize]
    }

    /// Label used in the report.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
            Self::Alt5 => "Alt 5",
            Self::Alt4 => "Alt 4",
            Self::Alt0 => "Alt 0",
            Self::Alt1 => "Alt 1",
            Self::Alt2 => "Alt 2",
            Self::Alt3 => "Alt 3",
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Pin level as sampled by the level register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Logic low.
    Low,
    /// Logic high.
    High,
}

impl Level {
    /// Label used in the report.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::High => "High",
        }
    }
}

impl From<bool> for Level {
    fn from(bit: bool) -> Self {
        if bit {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Event detect status of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// No event since the status was last cleared.
    None,
    /// A programmed trigger condition occurred.
    Detected,
}

impl Event {
    /// Label used in the report.
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "No event",
            Self::Detected => "Event detected",
        }
    }
}

impl From<bool> for Event {
    fn from(bit: bool) -> Self {
        if bit {
            Self::Detected
        } else {
            Self::None
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Decoded state of one GPIO pin.
///
/// Displays as a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    /// GPIO number.
    pub pin: u8,
    /// Selected function.
    pub function: Function,
    /// Current level.
    pub level: Level,
    /// Event detect status.
    pub event: Event,
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GPIO {:2}: Function: {:<6}  Level: {:<8}  Event: {:<8}",
            self.pin, self.function, self.level, self.event
        )
    }
}

/// Reads bit `pin % 32` of the word at `offset`.
fn pin_bit(space: &(impl RegisterSpace + ?Sized), offset: usize, pin: u8) -> bool {
    (space.word(offset) >> (pin % BIT_PINS_PER_REG)) & 1 != 0
}

/// Decodes the state of `pin`.
///
/// Every register is read when needed, thus the three fields may originate
/// from different moments in time.
///
/// # Panics
/// Panics if `pin` is not below [`GPIO_COUNT`].
pub fn decode_pin(space: &(impl RegisterSpace + ?Sized), pin: u8) -> PinState {
    assert!(pin < GPIO_COUNT, "GPIO {pin} does not exist");

    let shift = u32::from(pin % FSEL_PINS_PER_REG) * FSEL_BITS;
    let function = Function::from_bits(space.word(gpfsel(pin)) >> shift);
    let level = Level::from(pin_bit(space, gplev(pin), pin));
    let event = Event::from(pin_bit(space, gpeds(pin), pin));

    PinState { pin, function, level, event }
}

/// Decoded states of all pins in ascending order.
pub fn pin_states<S: RegisterSpace + ?Sized>(space: &S) -> PinStates<'_, S> {
    PinStates { space, next: 0 }
}

/// Generates the report, one line per pin in ascending order.
pub fn generate_report<S: RegisterSpace + ?Sized>(space: &S) -> Report<'_, S> {
    Report { states: pin_states(space) }
}

/// Iterator over decoded pin states.
#[derive(Debug)]
pub struct PinStates<'a, S: ?Sized> {
    space: &'a S,
    next: u8,
}

impl<S: RegisterSpace + ?Sized> Iterator for PinStates<'_, S> {
    type Item = PinState;

    fn next(&mut self) -> Option<PinState> {
        if self.next >= GPIO_COUNT {
            return None;
        }

        let state = decode_pin(self.space, self.next);
        self.next += 1;
        Some(state)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::from(GPIO_COUNT.saturating_sub(self.next));
        (left, Some(left))
    }
}

impl<S: RegisterSpace + ?Sized> ExactSizeIterator for PinStates<'_, S> {}

impl<S: RegisterSpace + ?Sized> FusedIterator for PinStates<'_, S> {}

/// Iterator over report lines.
#[derive(Debug)]
pub struct Report<'a, S: ?Sized> {
    states: PinStates<'a, S>,
}

impl<S: RegisterSpace + ?Sized> Iterator for Report<'_, S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.states.next().map(|state| state.to_string())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.states.size_hint()
    }
}

impl<S: RegisterSpace + ?Sized> ExactSizeIterator for Report<'_, S> {}

impl<S: RegisterSpace + ?Sized> FusedIterator for Report<'_, S> {}
