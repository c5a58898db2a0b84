use std::time::Duration;

use crate::memory::ADDRESS_LIMIT;

/// Line levels seen by the chip; `true` means asserted (electrically low
/// for the active-low lines).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct EepromPins {
	pub chip_select: bool,
	pub output_enable: bool,
	pub write_enable: bool,
	pub address: u16,
	/// data bus, if fully driven by the controller
	pub data: Option<u8>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct WriteCycle {
	address: u16,
	started: Duration,
}

/// 2K x 8 parallel EEPROM
///
/// The address is latched on the falling edge of /WE, data on the rising
/// edge. Protocol errors are counted, not fatal.
pub struct Eeprom {
	contents: Vec<u8>,
	pins: EepromPins,
	write_cycle: Option<WriteCycle>,
	// time of the last completed write pulse; /CS must stay low a while
	recovery_from: Option<Duration>,
	writes: usize,
	violations: usize,
}

impl Eeprom {
	pub fn new() -> Self {
		Self::with_contents(&[])
	}

	/// Missing bytes are erased (0xff)
	pub fn with_contents(contents: &[u8]) -> Self {
		assert!(contents.len() <= ADDRESS_LIMIT as usize);
		let mut all = vec![0xffu8; ADDRESS_LIMIT as usize];
		all[..contents.len()].copy_from_slice(contents);
		Eeprom {
			contents: all,
			pins: EepromPins::default(),
			write_cycle: None,
			recovery_from: None,
			writes: 0,
			violations: 0,
		}
	}

	pub fn contents(&self) -> &[u8] {
		&self.contents
	}

	pub fn get(&self, address: u16) -> u8 {
		self.contents[address as usize]
	}

	pub fn writes(&self) -> usize {
		self.writes
	}

	pub fn violations(&self) -> usize {
		self.violations
	}

	fn violation(&mut self, what: &str) {
		warn!("eeprom: {} (pins: {:?})", what, self.pins);
		self.violations += 1;
	}

	/// Byte the chip drives onto the data bus, if any
	pub fn output(&self) -> Option<u8> {
		let p = &self.pins;
		if p.chip_select && p.output_enable && !p.write_enable {
			Some(self.contents[p.address as usize])
		} else {
			None
		}
	}

	pub fn update(&mut self, pins: EepromPins, now: Duration) {
		let prev = self.pins;
		self.pins = pins;

		if let Some(from) = self.recovery_from {
			let released = prev.chip_select && !pins.chip_select;
			let next_pulse = !prev.write_enable && pins.write_enable;
			if released || next_pulse {
				if now == from {
					self.violation("write pulse not followed by recovery time");
				}
				self.recovery_from = None;
			}
		}

		if let Some(cycle) = self.write_cycle {
			if !pins.chip_select {
				self.violation("chip deselected during write pulse");
				self.write_cycle = None;
				return;
			}
			if pins.address != prev.address {
				self.violation("address changed during write pulse");
			}
			if pins.data != prev.data {
				self.violation("data changed during write pulse");
			}
			if pins.output_enable {
				self.violation("output enabled during write pulse");
			}
			if !pins.write_enable {
				self.write_cycle = None;
				if now == cycle.started {
					self.violation("write pulse too short");
				}
				match pins.data {
					Some(data) => {
						self.contents[cycle.address as usize] = data;
						self.writes += 1;
					},
					None => self.violation("data bus not driven at end of write pulse"),
				}
				self.recovery_from = Some(now);
			}
		} else if pins.write_enable && !prev.write_enable && pins.chip_select {
			if pins.output_enable {
				self.violation("write pulse with output enabled");
			}
			self.write_cycle = Some(WriteCycle {
				address: pins.address,
				started: now,
			});
		}
	}
}

impl Default for Eeprom {
	fn default() -> Self {
		Eeprom::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn pins(cs: bool, oe: bool, we: bool, address: u16, data: Option<u8>) -> EepromPins {
		EepromPins {
			chip_select: cs,
			output_enable: oe,
			write_enable: we,
			address,
			data,
		}
	}

	#[test]
	fn drives_only_when_selected() {
		let mut ee = Eeprom::with_contents(&[0x12, 0x34]);
		let t = Duration::from_millis(0);
		ee.update(pins(true, false, false, 1, None), t);
		assert_eq!(ee.output(), None);
		ee.update(pins(true, true, false, 1, None), t);
		assert_eq!(ee.output(), Some(0x34));
		ee.update(pins(false, true, false, 1, None), t);
		assert_eq!(ee.output(), None);
		assert_eq!(ee.get(2), 0xff);
	}

	#[test]
	fn write_pulse() {
		let mut ee = Eeprom::new();
		let ms = Duration::from_millis;
		ee.update(pins(true, false, false, 0x7f0, Some(0xb0)), ms(0));
		ee.update(pins(true, false, true, 0x7f0, Some(0xb0)), ms(0));
		ee.update(pins(true, false, false, 0x7f0, Some(0xb0)), ms(1));
		ee.update(pins(false, false, false, 0x7f0, Some(0xb0)), ms(2));
		assert_eq!(ee.get(0x7f0), 0xb0);
		assert_eq!(ee.writes(), 1);
		assert_eq!(ee.violations(), 0);
	}

	#[test]
	fn data_after_write_enable_is_flagged() {
		let mut ee = Eeprom::new();
		let ms = Duration::from_millis;
		ee.update(pins(true, false, false, 0x10, Some(0x00)), ms(0));
		ee.update(pins(true, false, true, 0x10, Some(0x00)), ms(0));
		ee.update(pins(true, false, true, 0x10, Some(0x55)), ms(0));
		ee.update(pins(true, false, false, 0x10, Some(0x55)), ms(1));
		assert_eq!(ee.get(0x10), 0x55);
		assert_eq!(ee.violations(), 1);
	}

	#[test]
	fn missing_delays_are_flagged() {
		let mut ee = Eeprom::new();
		let t = Duration::from_millis(3);
		ee.update(pins(true, false, false, 0x20, Some(0x01)), t);
		ee.update(pins(true, false, true, 0x20, Some(0x01)), t);
		ee.update(pins(true, false, false, 0x20, Some(0x01)), t);
		ee.update(pins(false, false, false, 0x20, Some(0x01)), t);
		// short pulse and no recovery
		assert_eq!(ee.violations(), 2);
	}

	#[test]
	fn deselect_aborts_write() {
		let mut ee = Eeprom::new();
		let ms = Duration::from_millis;
		ee.update(pins(true, false, false, 0x30, Some(0x01)), ms(0));
		ee.update(pins(true, false, true, 0x30, Some(0x01)), ms(0));
		ee.update(pins(false, false, true, 0x30, Some(0x01)), ms(1));
		ee.update(pins(false, false, false, 0x30, Some(0x01)), ms(2));
		assert_eq!(ee.get(0x30), 0xff);
		assert_eq!(ee.violations(), 1);
	}
}
