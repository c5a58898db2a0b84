/// Simulated board: port registers with the EEPROM and the display attached
///
/// Every register access is recorded as a `BusEvent`, and waits advance a
/// simulated clock instead of sleeping. The attached chip models check the
/// bus protocol and count violations; bus contention (chip and controller
/// driving the data bus at the same time) is counted separately.

mod eeprom;
mod lcd;

use std::time::Duration;

pub use self::eeprom::{
	Eeprom,
	EepromPins,
};

pub use self::lcd::{
	Lcd,
	LcdTransaction,
};

use crate::bus::{
	Bus,
	Port,
};
use crate::bus::pins::*;
use crate::display::RegisterSelect;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BusEvent {
	Direction(Port, u8),
	Write(Port, u8),
	Read(Port, u8),
	Wait(Duration),
}

impl BusEvent {
	pub fn is_wait(&self) -> bool {
		match self {
			BusEvent::Wait(_) => true,
			_ => false,
		}
	}
}

// external pull-ups on the board: /CS, /OE and /WE stay inactive while the
// controller doesn't drive them
fn external_pull_ups(port: Port) -> u8 {
	match port {
		Port::F => CHIP_SELECT | OUTPUT_ENABLE,
		Port::E => WRITE_ENABLE,
		_ => 0x00,
	}
}

pub struct SimulatedBus {
	direction: [u8; 5],
	output: [u8; 5],
	eeprom: Eeprom,
	lcd: Lcd,
	events: Vec<BusEvent>,
	elapsed: Duration,
	contention: usize,
}

impl SimulatedBus {
	pub fn new() -> Self {
		Self::with_eeprom(Eeprom::new())
	}

	pub fn with_memory(contents: &[u8]) -> Self {
		Self::with_eeprom(Eeprom::with_contents(contents))
	}

	fn with_eeprom(eeprom: Eeprom) -> Self {
		SimulatedBus {
			direction: [0u8; 5],
			output: [0u8; 5],
			eeprom,
			lcd: Lcd::new(),
			events: Vec::new(),
			elapsed: Duration::from_secs(0),
			contention: 0,
		}
	}

	pub fn events(&self) -> &[BusEvent] {
		&self.events
	}

	pub fn clear_events(&mut self) {
		self.events.clear();
		self.lcd.clear_transactions();
	}

	pub fn elapsed(&self) -> Duration {
		self.elapsed
	}

	pub fn contention(&self) -> usize {
		self.contention
	}

	pub fn eeprom(&self) -> &Eeprom {
		&self.eeprom
	}

	pub fn lcd(&self) -> &Lcd {
		&self.lcd
	}

	pub fn direction(&self, port: Port) -> u8 {
		self.direction[port.index()]
	}

	pub fn output(&self, port: Port) -> u8 {
		self.output[port.index()]
	}

	// level of the lines as driven by the controller or the pull-ups
	// (internal pull-up: PORTx bit set on an input)
	fn driven_level(&self, port: Port) -> u8 {
		let ddr = self.direction(port);
		let out = self.output(port);
		(out & ddr) | ((external_pull_ups(port) | out) & !ddr)
	}

	fn controller_data(&self) -> Option<u8> {
		if ALL_OUTPUTS == self.direction(DATA_PORT) {
			Some(self.output(DATA_PORT))
		} else {
			None
		}
	}

	fn eeprom_pins(&self) -> EepromPins {
		let control = self.driven_level(MEMORY_CONTROL_PORT);
		let address_high = ((control & ADDRESS_HIGH_MASK) as u16) << 4;
		EepromPins {
			chip_select: 0 == control & CHIP_SELECT,
			output_enable: 0 == control & OUTPUT_ENABLE,
			write_enable: 0 == self.driven_level(WRITE_ENABLE_PORT) & WRITE_ENABLE,
			address: self.driven_level(ADDRESS_LOW_PORT) as u16 | address_high,
			data: self.controller_data(),
		}
	}

	// propagate line changes to the attached chips
	fn update(&mut self) {
		let now = self.elapsed;

		let pins = self.eeprom_pins();
		self.eeprom.update(pins, now);

		let control = self.driven_level(DISPLAY_CONTROL_PORT);
		let register_select = RegisterSelect::from(0 != control & DISPLAY_REGISTER_SELECT);
		let data = self.controller_data();
		self.lcd.update(0 != control & DISPLAY_ENABLE, register_select, data, now);

		if self.eeprom.output().is_some() && 0 != self.direction(DATA_PORT) {
			warn!("bus contention: EEPROM drives data bus configured as output 0x{:02x}", self.direction(DATA_PORT));
			self.contention += 1;
		}
	}
}

impl Default for SimulatedBus {
	fn default() -> Self {
		SimulatedBus::new()
	}
}

impl Bus for SimulatedBus {
	fn set_direction(&mut self, port: Port, outputs: u8) {
		self.events.push(BusEvent::Direction(port, outputs));
		self.direction[port.index()] = outputs;
		self.update();
	}

	fn write_port(&mut self, port: Port, value: u8) {
		self.events.push(BusEvent::Write(port, value));
		self.output[port.index()] = value;
		self.update();
	}

	fn read_port(&mut self, port: Port) -> u8 {
		let ddr = self.direction(port);
		let mut value = self.driven_level(port);
		if port == DATA_PORT {
			if let Some(data) = self.eeprom.output() {
				value = (value & ddr) | (data & !ddr);
			}
		}
		self.events.push(BusEvent::Read(port, value));
		value
	}

	fn wait(&mut self, duration: Duration) {
		self.events.push(BusEvent::Wait(duration));
		self.elapsed += duration;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn pull_ups_keep_memory_inactive() {
		let sim = SimulatedBus::new();
		let pins = sim.eeprom_pins();
		assert!(!pins.chip_select);
		assert!(!pins.output_enable);
		assert!(!pins.write_enable);
		assert_eq!(pins.data, None);
	}

	#[test]
	fn contention_detected() {
		let mut sim = SimulatedBus::with_memory(&[0x42]);
		sim.write_port(Port::F, 0x00);
		sim.set_direction(Port::F, 0x73);
		assert_eq!(sim.contention(), 0);
		assert_eq!(sim.read_port(Port::B), 0x42);
		sim.set_direction(Port::B, 0x0f);
		assert_eq!(sim.contention(), 1);
	}

	#[test]
	fn waits_advance_clock() {
		let mut sim = SimulatedBus::new();
		sim.wait(Duration::from_millis(3));
		sim.wait(Duration::from_millis(4));
		assert_eq!(sim.elapsed(), Duration::from_millis(7));
		assert!(sim.events().iter().all(|e| e.is_wait()));
	}

	#[test]
	fn reads_output_latch_on_outputs() {
		let mut sim = SimulatedBus::new();
		sim.set_direction(Port::D, 0xf0);
		sim.write_port(Port::D, 0xa5);
		// inputs read their pull-up setting
		assert_eq!(sim.read_port(Port::D), 0xa5);
		sim.write_port(Port::D, 0xa0);
		assert_eq!(sim.read_port(Port::D), 0xa0);
	}
}
