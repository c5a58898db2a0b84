/// Parallel EEPROM (2K x 8) on the shared data bus
///
/// Read cycle: address on the bus, /CS and /OE low together, wait the
/// access time, sample the data bus, /CS and /OE high again.
///
/// Write cycle: address and data on the bus with /CS low and /OE high,
/// pulse /WE low for the write time, then wait again before releasing /CS.
/// Address and data must not change while /WE is low.

mod control;

pub use self::control::{
	ADDRESS_LIMIT,
	ADDRESS_WIDTH,
	ControlWord,
	address_high,
	address_low,
};

use crate::bus::Bus;
use crate::bus::pins::*;
use crate::timing::Timing;

pub struct Memory<'a, B: ?Sized + Bus + 'a> {
	bus: &'a mut B,
	timing: &'a Timing,
}

impl<'a, B: ?Sized + Bus> Memory<'a, B> {
	pub fn new(bus: &'a mut B, timing: &'a Timing) -> Self {
		Memory { bus, timing }
	}

	/// Configure the control lines (and A8..A10) as outputs and release the
	/// chip.
	pub fn init(&mut self) {
		// levels first, so the lines never go low when switching to output
		self.idle();
		self.bus.write_port(WRITE_ENABLE_PORT, WRITE_ENABLE);
		self.bus.set_direction(MEMORY_CONTROL_PORT, MEMORY_CONTROL_OUTPUTS);
		self.bus.set_direction(WRITE_ENABLE_PORT, WRITE_ENABLE);
	}

	fn idle(&mut self) {
		self.bus.write_port(MEMORY_CONTROL_PORT, ControlWord::idle().0);
	}

	pub fn read(&mut self, address: u16) -> u8 {
		assert!(address < ADDRESS_LIMIT);

		// release the data bus before the chip starts driving it
		self.bus.set_direction(DATA_PORT, ALL_INPUTS);
		self.bus.set_direction(ADDRESS_LOW_PORT, ALL_OUTPUTS);
		self.bus.write_port(ADDRESS_LOW_PORT, address_low(address));
		// /CS and /OE in the same port write
		self.bus.write_port(MEMORY_CONTROL_PORT, ControlWord::read(address).0);
		self.bus.wait(self.timing.memory_access);
		let data = self.bus.read_port(DATA_PORT);
		self.idle();

		trace!("mem read  @{:03x}: {:02x}", address, data);
		data
	}

	pub fn write(&mut self, address: u16, data: u8) {
		assert!(address < ADDRESS_LIMIT);

		self.bus.set_direction(DATA_PORT, ALL_OUTPUTS);
		self.bus.set_direction(ADDRESS_LOW_PORT, ALL_OUTPUTS);
		self.bus.write_port(ADDRESS_LOW_PORT, address_low(address));
		self.bus.write_port(MEMORY_CONTROL_PORT, ControlWord::write(address).0);
		self.bus.write_port(DATA_PORT, data);

		// bus is stable now, pulse /WE
		self.bus.write_port(WRITE_ENABLE_PORT, 0x00);
		self.bus.wait(self.timing.memory_access);
		self.bus.write_port(WRITE_ENABLE_PORT, WRITE_ENABLE);
		self.bus.wait(self.timing.memory_access);
		self.idle();

		trace!("mem write @{:03x}: {:02x}", address, data);
	}

	/// Fill `target` with consecutive bytes starting at `start`
	pub fn read_into(&mut self, start: u16, target: &mut [u8]) -> crate::AResult<()> {
		ensure!((start as usize) + target.len() <= ADDRESS_LIMIT as usize,
			"read of {} bytes at 0x{:03x} exceeds memory size 0x{:03x}", target.len(), start, ADDRESS_LIMIT
		);
		for (address, t) in (start..).zip(target.iter_mut()) {
			*t = self.read(address);
		}
		Ok(())
	}
}
