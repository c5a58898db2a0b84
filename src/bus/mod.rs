/// Port wiring of the board
///
/// Display (HD44780 compatible, 8-bit mode, write only):
/// - D0..D7 on port B
/// - E on C6, RS on C7
///
/// EEPROM (2K x 8, 28C16 style parallel interface):
/// - D0..D7 on port B (shared with the display)
/// - A0..A7 on port D
/// - A8..A10 on F4..F6
/// - /CS on F0, /OE on F1, /WE on E6
///
/// Port B is the only group driven by both sides; every transaction sets
/// its direction again before touching it.

mod hardware;
mod mapped;

pub use self::hardware::{
	Bus,
	Port,
	reliable_sleep,
};

pub use self::mapped::{
	MappedPorts,
	PORT_WINDOW_LEN,
};

pub mod pins {
	use super::Port;

	pub const DATA_PORT: Port = Port::B;

	pub const DISPLAY_CONTROL_PORT: Port = Port::C;
	pub const DISPLAY_ENABLE: u8 = 0x40;
	pub const DISPLAY_REGISTER_SELECT: u8 = 0x80;
	pub const DISPLAY_CONTROL_OUTPUTS: u8 = DISPLAY_ENABLE | DISPLAY_REGISTER_SELECT;

	pub const ADDRESS_LOW_PORT: Port = Port::D;

	pub const MEMORY_CONTROL_PORT: Port = Port::F;
	pub const CHIP_SELECT: u8 = 0x01; // active low
	pub const OUTPUT_ENABLE: u8 = 0x02; // active low
	pub const ADDRESS_HIGH_MASK: u8 = 0x70;
	pub const MEMORY_CONTROL_OUTPUTS: u8 = ADDRESS_HIGH_MASK | CHIP_SELECT | OUTPUT_ENABLE;

	pub const WRITE_ENABLE_PORT: Port = Port::E;
	pub const WRITE_ENABLE: u8 = 0x40; // active low

	pub const ALL_OUTPUTS: u8 = 0xff;
	pub const ALL_INPUTS: u8 = 0x00;
}
