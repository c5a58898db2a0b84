use std::fmt;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// 8-bit I/O port; each port has a direction register (DDRx), an output
/// register (PORTx) and an input register (PINx).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Port {
	B,
	C,
	D,
	E,
	F,
}

impl Port {
	pub fn index(self) -> usize {
		match self {
			Port::B => 0,
			Port::C => 1,
			Port::D => 2,
			Port::E => 3,
			Port::F => 4,
		}
	}

	// data-space address of PINx; DDRx and PORTx follow directly
	pub fn pin_register(self) -> usize {
		0x23 + 3 * self.index()
	}

	pub fn ddr_register(self) -> usize {
		self.pin_register() + 1
	}

	pub fn port_register(self) -> usize {
		self.pin_register() + 2
	}
}

impl fmt::Display for Port {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let name = match self {
			Port::B => "B",
			Port::C => "C",
			Port::D => "D",
			Port::E => "E",
			Port::F => "F",
		};
		write!(f, "{}", name)
	}
}

/// Raw access to the I/O ports both peripherals are wired to.
pub trait Bus {
	/// set direction of all pins of a port; a 1 bit configures the pin as
	/// output
	fn set_direction(&mut self, port: Port, outputs: u8);

	/// drive output levels (for pins configured as input this selects the
	/// pull-up)
	fn write_port(&mut self, port: Port, value: u8);

	/// sample the current pin levels
	fn read_port(&mut self, port: Port) -> u8;

	// block for (at least) the given duration
	fn wait(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, B: ?Sized + Bus> Bus for &'a mut B {
	fn set_direction(&mut self, port: Port, outputs: u8) {
		B::set_direction(*self, port, outputs)
	}

	fn write_port(&mut self, port: Port, value: u8) {
		B::write_port(*self, port, value)
	}

	fn read_port(&mut self, port: Port) -> u8 {
		B::read_port(*self, port)
	}

	fn wait(&mut self, duration: Duration) {
		B::wait(*self, duration)
	}
}
