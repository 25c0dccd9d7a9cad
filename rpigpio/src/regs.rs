//! GPIO controller register map.
//!
//! Offsets are in bytes relative to the start of the GPIO register block.

use byteorder::{ByteOrder, LE};
use std::fmt;

/// Physical base address of the GPIO controller on BCM2835.
pub const GPIO_BASE: u64 = 0x2020_0000;

/// Size of the register space covered by the report.
pub const REGISTER_SPACE_SIZE: usize = 0xb0;

/// Number of GPIO lines.
pub const GPIO_COUNT: u8 = 54;

/// GPIO function select register 0 (GPFSEL0).
///
/// Six registers, 10 pins per register, 3 bits per pin.
pub const GPFSEL0: usize = 0x00;

/// GPIO pin level register 0 (GPLEV0).
///
/// Two registers, 32 pins per register, 1 bit per pin.
pub const GPLEV0: usize = 0x34;

/// GPIO event detect status register 0 (GPEDS0).
///
/// Two registers, same packing as [`GPLEV0`].
pub const GPEDS0: usize = 0x40;

/// Pins per function select register.
pub const FSEL_PINS_PER_REG: u8 = 10;

/// Bits per pin in a function select register.
pub const FSEL_BITS: u32 = 3;

/// Pins per level or event detect register.
pub const BIT_PINS_PER_REG: u8 = 32;

/// Offset of the function select register holding `pin`.
pub const fn gpfsel(pin: u8) -> usize {
    GPFSEL0 + (pin / FSEL_PINS_PER_REG) as usize * 4
}

/// Offset of the pin level register holding `pin`.
pub const fn gplev(pin: u8) -> usize {
    GPLEV0 + (pin / BIT_PINS_PER_REG) as usize * 4
}

/// Offset of the event detect status register holding `pin`.
pub const fn gpeds(pin: u8) -> usize {
    GPEDS0 + (pin / BIT_PINS_PER_REG) as usize * 4
}

/// Read-only view of the GPIO register space.
///
/// Contents are owned by the hardware and may change between any two reads.
pub trait RegisterSpace {
    /// Reads the little-endian 32-bit word at byte `offset`.
    ///
    /// # Panics
    /// Panics if `offset` is not 4-byte aligned or the word does not lie
    /// within [`REGISTER_SPACE_SIZE`] bytes.
    fn word(&self, offset: usize) -> u32;
}

impl<T: RegisterSpace + ?Sized> RegisterSpace for &T {
    fn word(&self, offset: usize) -> u32 {
        (**self).word(offset)
    }
}

/// Asserts that `offset` addresses a whole word inside the register space.
#[track_caller]
pub(crate) fn check_offset(offset: usize) {
    assert!(
        offset % 4 == 0 && offset <= REGISTER_SPACE_SIZE - 4,
        "register offset 0x{offset:x} outside of register space"
    );
}

/// Owned copy of the register space.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterImage([u8; REGISTER_SPACE_SIZE]);

impl RegisterImage {
    /// Image with all registers cleared.
    pub const fn zeroed() -> Self {
        Self([0; REGISTER_SPACE_SIZE])
    }

    /// Image from raw bytes.
    ///
    /// Returns `None` unless `bytes` is exactly [`REGISTER_SPACE_SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Copies the current contents of `space` word by word.
    ///
    /// The copy is not atomic.
    pub fn capture(space: &impl RegisterSpace) -> Self {
        let mut image = Self::zeroed();
        for offset in (0..REGISTER_SPACE_SIZE).step_by(4) {
            image.set_word(offset, space.word(offset));
        }
        image
    }

    /// Sets the word at byte `offset`.
    ///
    /// # Panics
    /// Panics under the same conditions as [`RegisterSpace::word`].
    #[track_caller]
    pub fn set_word(&mut self, offset: usize, value: u32) {
        check_offset(offset);
        LE::write_u32(&mut self.0[offset..offset + 4], value);
    }

    /// Raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for RegisterImage {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl RegisterSpace for RegisterImage {
    #[track_caller]
    fn word(&self, offset: usize) -> u32 {
        check_offset(offset);
        LE::read_u32(&self.0[offset..offset + 4])
    }
}

impl fmt::Debug for RegisterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for offset in (0..REGISTER_SPACE_SIZE).step_by(4) {
            list.entry(&format_args!("{:08x}", self.word(offset)));
        }
        list.finish()
    }
}
