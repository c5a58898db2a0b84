use crate::bus::Bus;
use crate::display::Display;
use crate::memory::Memory;
use crate::timing::Timing;

/// Owner of the shared port lines.
///
/// Drivers borrow the bus exclusively, so a memory transaction can't be
/// interleaved with a display transaction; each driver call returns with
/// its lines released.
pub struct Board<B: Bus> {
	bus: B,
	timing: Timing,
}

impl<B: Bus> Board<B> {
	pub fn new(bus: B, timing: Timing) -> Self {
		Board { bus, timing }
	}

	pub fn memory(&mut self) -> Memory<B> {
		Memory::new(&mut self.bus, &self.timing)
	}

	pub fn display(&mut self) -> Display<B> {
		Display::new(&mut self.bus, &self.timing)
	}

	pub fn timing(&self) -> &Timing {
		&self.timing
	}

	/// Hold all lines for the given time
	pub fn wait(&mut self, duration: std::time::Duration) {
		self.bus.wait(duration);
	}

	pub fn bus(&self) -> &B {
		&self.bus
	}

	pub fn bus_mut(&mut self) -> &mut B {
		&mut self.bus
	}

	pub fn into_bus(self) -> B {
		self.bus
	}
}
