/// HD44780 compatible character display in 8-bit mode (20x4)
///
/// Every transaction drives the data bus with E high and waits the setup
/// time; the controller latches data and RS on the falling edge of E. R/W
/// is tied to ground, so the controller never drives the data bus.

mod line;

use std::fmt;

pub use self::line::{
	LINE_CAPACITY,
	LineBuffer,
};

use crate::bus::Bus;
use crate::bus::pins::*;
use crate::timing::Timing;

pub const DISPLAY_WIDTH: usize = 20;

pub mod instructions {
	pub const CLEAR: u8 = 0x01;
	pub const RETURN_HOME: u8 = 0x02;
	/// cursor moves right, no display shift
	pub const ENTRY_MODE_SET: u8 = 0x06;
	/// display on, cursor on, blink off
	pub const DISPLAY_CONTROL: u8 = 0x0e;
	/// 8-bit interface, two lines, 5x7 font
	pub const FUNCTION_SET: u8 = 0x38;
	pub const SET_DDRAM_ADDRESS: u8 = 0x80;
}

use self::instructions::*;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RegisterSelect {
	Instruction,
	Data,
}

impl RegisterSelect {
	fn control_bits(self) -> u8 {
		match self {
			RegisterSelect::Instruction => 0x00,
			RegisterSelect::Data => DISPLAY_REGISTER_SELECT,
		}
	}
}

impl From<bool> for RegisterSelect {
	fn from(is_data: bool) -> Self {
		match is_data {
			false => RegisterSelect::Instruction,
			true => RegisterSelect::Data,
		}
	}
}

pub struct Display<'a, B: ?Sized + Bus + 'a> {
	bus: &'a mut B,
	timing: &'a Timing,
}

impl<'a, B: ?Sized + Bus> Display<'a, B> {
	pub fn new(bus: &'a mut B, timing: &'a Timing) -> Self {
		Display { bus, timing }
	}

	/// Single transaction; data is latched when E drops at the end.
	pub fn send(&mut self, register_select: RegisterSelect, data: u8) {
		let rs = register_select.control_bits();

		self.bus.set_direction(DATA_PORT, ALL_OUTPUTS);
		self.bus.set_direction(DISPLAY_CONTROL_PORT, DISPLAY_CONTROL_OUTPUTS);
		self.bus.write_port(DATA_PORT, data);
		self.bus.write_port(DISPLAY_CONTROL_PORT, rs | DISPLAY_ENABLE);
		self.bus.wait(self.timing.display_setup);
		self.bus.write_port(DISPLAY_CONTROL_PORT, rs);

		trace!("lcd {:?}: {:02x}", register_select, data);
	}

	pub fn command(&mut self, instruction: u8) {
		self.send(RegisterSelect::Instruction, instruction);
	}

	/// Mode setup; has to run before anything else is sent.
	pub fn init(&mut self) {
		self.command(FUNCTION_SET);
		self.command(ENTRY_MODE_SET);
		self.command(DISPLAY_CONTROL);
		self.clear();
	}

	/// Clear display and move cursor home; clearing takes the controller
	/// much longer than other instructions.
	pub fn clear(&mut self) {
		debug!("lcd clear");
		self.command(CLEAR);
		self.bus.wait(self.timing.clear_settle);
	}

	/// Move the cursor to a DDRAM address (second line starts at 0x40)
	pub fn set_address(&mut self, address: u8) {
		self.command(SET_DDRAM_ADDRESS | (address & 0x7f));
	}

	pub fn print_bytes(&mut self, text: &[u8]) {
		for &c in text {
			self.send(RegisterSelect::Data, c);
		}
	}

	/// No wrapping: the caller has to keep the text within the line.
	pub fn print(&mut self, text: &str) {
		self.print_bytes(text.as_bytes());
	}

	/// Format into a line buffer and print it; overlong text is cut off at
	/// `LINE_CAPACITY`. Returns whether text was cut off.
	pub fn print_fmt(&mut self, args: fmt::Arguments) -> bool {
		let line = LineBuffer::format(args);
		if line.is_truncated() {
			debug!("lcd line truncated to {:?}", line.as_str());
		}
		self.print_bytes(line.as_bytes());
		line.is_truncated()
	}
}

#[cfg(test)]
mod test {
	use std::time::Duration;

	use super::*;
	use crate::bus::Port;
	use crate::sim::{
		BusEvent,
		SimulatedBus,
	};

	fn check_text(sim: &SimulatedBus, expected: &str) {
		assert_eq!(sim.lcd().text(), expected);
		assert_eq!(sim.lcd().violations(), 0);
		assert_eq!(sim.contention(), 0);
	}

	#[test]
	fn send_sequence() {
		let mut sim = SimulatedBus::new();
		let timing = Timing::default();
		Display::new(&mut sim, &timing).send(RegisterSelect::Data, b'A');

		assert_eq!(sim.events(), &[
			BusEvent::Direction(Port::B, 0xff),
			BusEvent::Direction(Port::C, 0xc0),
			BusEvent::Write(Port::B, 0x41),
			BusEvent::Write(Port::C, 0xc0),
			BusEvent::Wait(Duration::from_millis(5)),
			BusEvent::Write(Port::C, 0x80),
		][..]);

		let mut sim = SimulatedBus::new();
		Display::new(&mut sim, &timing).send(RegisterSelect::Instruction, CLEAR);
		assert_eq!(&sim.events()[2..], &[
			BusEvent::Write(Port::B, 0x01),
			BusEvent::Write(Port::C, 0x40),
			BusEvent::Wait(Duration::from_millis(5)),
			BusEvent::Write(Port::C, 0x00),
		][..]);
	}

	#[test]
	fn init_order() {
		let mut sim = SimulatedBus::new();
		let timing = Timing::default();
		Display::new(&mut sim, &timing).init();

		let tx = sim.lcd().transactions();
		assert_eq!(tx.len(), 4);
		let commands: Vec<u8> = tx.iter()
			.inspect(|t| assert_eq!(t.register_select, RegisterSelect::Instruction))
			.map(|t| t.data)
			.collect();
		assert_eq!(commands, vec![0x38, 0x06, 0x0e, 0x01]);

		let lcd = sim.lcd();
		assert!(lcd.is_eight_bit());
		assert!(lcd.is_display_on());
		assert!(lcd.is_cursor_on());
		assert!(!lcd.is_blink_on());
		assert_eq!(lcd.violations(), 0);
	}

	#[test]
	fn clear_waits_longer() {
		let mut sim = SimulatedBus::new();
		let timing = Timing::default();
		Display::new(&mut sim, &timing).clear();

		let waits: Vec<Duration> = sim.events().iter()
			.filter_map(|e| match *e {
				BusEvent::Wait(d) => Some(d),
				_ => None,
			})
			.collect();
		assert_eq!(waits, vec![timing.display_setup, timing.clear_settle]);
		assert!(timing.clear_settle > timing.display_setup);
		assert_eq!(sim.events().last(), Some(&BusEvent::Wait(timing.clear_settle)));
	}

	#[test]
	fn print_text() {
		let mut sim = SimulatedBus::new();
		let timing = Timing::default();
		let mut lcd = Display::new(&mut sim, &timing);
		lcd.init();
		lcd.print("hello");
		check_text(&sim, "hello");
		assert_eq!(sim.lcd().rows()[0], "hello               ");
	}

	#[test]
	fn print_fmt_truncates() {
		let mut sim = SimulatedBus::new();
		let timing = Timing::default();
		let mut lcd = Display::new(&mut sim, &timing);
		lcd.init();
		let truncated = lcd.print_fmt(format_args!("{}-{}", "0123456789", "abcdefghijklmnop"));
		assert!(truncated);
		check_text(&sim, "0123456789-abcdefghi");

		let data_count = sim.lcd().transactions().iter()
			.filter(|t| t.register_select == RegisterSelect::Data)
			.count();
		assert_eq!(data_count, DISPLAY_WIDTH);
	}

	#[test]
	fn print_fmt_short() {
		let mut sim = SimulatedBus::new();
		let timing = Timing::default();
		let mut lcd = Display::new(&mut sim, &timing);
		lcd.init();
		assert!(!lcd.print_fmt(format_args!("0x{:04x}: {:02x} ", 0x10, 0xe6)));
		assert!(!lcd.print_fmt(format_args!("{:02x} ", 0x03)));
		check_text(&sim, "0x0010: e6 03 ");
	}

	#[test]
	fn second_line_address() {
		let mut sim = SimulatedBus::new();
		let timing = Timing::default();
		let mut lcd = Display::new(&mut sim, &timing);
		lcd.init();
		lcd.set_address(0x40);
		lcd.print("two");
		assert_eq!(sim.lcd().rows()[1], "two                 ");
		assert_eq!(sim.lcd().violations(), 0);
	}
}
