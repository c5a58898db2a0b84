use std::fmt;

use crate::bus::pins::{
	ADDRESS_HIGH_MASK,
	CHIP_SELECT,
	OUTPUT_ENABLE,
};

/// Highest address bit is A10
pub const ADDRESS_WIDTH: usize = 11;
pub const ADDRESS_LIMIT: u16 = 1 << ADDRESS_WIDTH;

pub fn address_low(address: u16) -> u8 {
	address as u8
}

// A8..A10 land on bits 4..6 of the control port
pub fn address_high(address: u16) -> u8 {
	(address >> 4) as u8 & ADDRESS_HIGH_MASK
}

/// Value of the memory control port: /CS, /OE and A8..A10
///
/// /CS and /OE are active low: a cleared bit enables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlWord(pub u8);

impl ControlWord {
	/// /CS and /OE off, address bits low
	pub fn idle() -> Self {
		ControlWord(CHIP_SELECT | OUTPUT_ENABLE)
	}

	/// /CS and /OE on, chip drives the data bus
	pub fn read(address: u16) -> Self {
		ControlWord(address_high(address))
	}

	/// /CS on, /OE off
	pub fn write(address: u16) -> Self {
		ControlWord(OUTPUT_ENABLE | address_high(address))
	}

	pub fn is_chip_select(&self) -> bool {
		0 == self.0 & CHIP_SELECT
	}

	pub fn is_output_enable(&self) -> bool {
		0 == self.0 & OUTPUT_ENABLE
	}

	pub fn is_idle(&self) -> bool {
		!self.is_chip_select() && !self.is_output_enable()
	}

	// A8..A10 as address bits
	pub fn address_bits(&self) -> u16 {
		((self.0 & ADDRESS_HIGH_MASK) as u16) << 4
	}
}

impl fmt::Display for ControlWord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl fmt::Debug for ControlWord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x} (address: 0x{:03x}", self.0, self.address_bits())?;
		if self.is_chip_select() { write!(f, " [CS]")?; }
		if self.is_output_enable() { write!(f, " [OE]")?; }
		write!(f, ")")
	}
}
