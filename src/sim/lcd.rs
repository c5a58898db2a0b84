use std::time::Duration;

use crate::display::RegisterSelect;
use crate::display::instructions::*;

const DDRAM_SIZE: usize = 0x80;
const LINE_LENGTH: u8 = 0x28;
const SECOND_LINE: u8 = 0x40;

// 20x4 module: rows 3 and 4 continue rows 1 and 2 in DDRAM
const ROW_STARTS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];
const ROW_WIDTH: usize = 20;

const EXECUTION_TIME: Duration = Duration::from_micros(37);
const CLEAR_TIME: Duration = Duration::from_micros(1520);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LcdTransaction {
	pub register_select: RegisterSelect,
	pub data: u8,
}

/// HD44780 in 8-bit write-only mode
pub struct Lcd {
	ddram: [u8; DDRAM_SIZE],
	address: u8,
	enable: bool,
	busy_until: Duration,
	eight_bit: bool,
	two_lines: bool,
	increment: bool,
	display_on: bool,
	cursor_on: bool,
	blink_on: bool,
	// characters written since the last clear
	text: Vec<u8>,
	transactions: Vec<LcdTransaction>,
	violations: usize,
}

impl Lcd {
	pub fn new() -> Self {
		Lcd {
			ddram: [b' '; DDRAM_SIZE],
			address: 0,
			enable: false,
			busy_until: Duration::from_secs(0),
			eight_bit: true,
			two_lines: false,
			increment: true,
			display_on: false,
			cursor_on: false,
			blink_on: false,
			text: Vec::new(),
			transactions: Vec::new(),
			violations: 0,
		}
	}

	pub fn transactions(&self) -> &[LcdTransaction] {
		&self.transactions
	}

	pub fn clear_transactions(&mut self) {
		self.transactions.clear();
	}

	pub fn violations(&self) -> usize {
		self.violations
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.text).into_owned()
	}

	pub fn rows(&self) -> Vec<String> {
		ROW_STARTS.iter().map(|&start| {
			let start = start as usize;
			String::from_utf8_lossy(&self.ddram[start..start + ROW_WIDTH]).into_owned()
		}).collect()
	}

	pub fn is_eight_bit(&self) -> bool {
		self.eight_bit
	}

	pub fn is_two_lines(&self) -> bool {
		self.two_lines
	}

	pub fn is_display_on(&self) -> bool {
		self.display_on
	}

	pub fn is_cursor_on(&self) -> bool {
		self.cursor_on
	}

	pub fn is_blink_on(&self) -> bool {
		self.blink_on
	}

	fn violation(&mut self, what: &str) {
		warn!("lcd: {}", what);
		self.violations += 1;
	}

	/// Called on every change of the control lines or the data bus; `data`
	/// is `None` unless the controller drives all data lines.
	pub fn update(&mut self, enable: bool, register_select: RegisterSelect, data: Option<u8>, now: Duration) {
		let falling = self.enable && !enable;
		self.enable = enable;
		if !falling {
			return;
		}

		let data = match data {
			Some(d) => d,
			None => {
				self.violation("data bus not driven when latching");
				return;
			},
		};
		if now < self.busy_until {
			self.violation("transaction while busy");
		}

		self.transactions.push(LcdTransaction { register_select, data });
		self.busy_until = now + match register_select {
			RegisterSelect::Instruction => self.instruction(data),
			RegisterSelect::Data => self.write_data(data),
		};
	}

	fn advance(&mut self) {
		let a = self.address;
		self.address = if self.increment {
			match a {
				_ if a == LINE_LENGTH - 1 => SECOND_LINE,
				_ if a == SECOND_LINE + LINE_LENGTH - 1 => 0,
				_ => (a + 1) & 0x7f,
			}
		} else {
			match a {
				0 => SECOND_LINE + LINE_LENGTH - 1,
				_ if a == SECOND_LINE => LINE_LENGTH - 1,
				_ => a - 1,
			}
		};
	}

	fn write_data(&mut self, data: u8) -> Duration {
		self.ddram[self.address as usize] = data;
		self.text.push(data);
		self.advance();
		EXECUTION_TIME
	}

	fn instruction(&mut self, data: u8) -> Duration {
		if data & SET_DDRAM_ADDRESS != 0 {
			self.address = data & 0x7f;
			EXECUTION_TIME
		} else if data & 0x40 != 0 {
			// CGRAM address, no custom characters here
			EXECUTION_TIME
		} else if data & 0x20 != 0 {
			self.eight_bit = data & 0x10 != 0;
			self.two_lines = data & 0x08 != 0;
			EXECUTION_TIME
		} else if data & 0x10 != 0 {
			// cursor / display shift
			EXECUTION_TIME
		} else if data & 0x08 != 0 {
			self.display_on = data & 0x04 != 0;
			self.cursor_on = data & 0x02 != 0;
			self.blink_on = data & 0x01 != 0;
			EXECUTION_TIME
		} else if data & 0x04 != 0 {
			self.increment = data & 0x02 != 0;
			EXECUTION_TIME
		} else if data & RETURN_HOME != 0 {
			self.address = 0;
			CLEAR_TIME
		} else if data == CLEAR {
			if !self.text.is_empty() {
				info!("lcd page: {:?}", self.text());
			}
			self.ddram = [b' '; DDRAM_SIZE];
			self.address = 0;
			self.increment = true;
			self.text.clear();
			CLEAR_TIME
		} else {
			EXECUTION_TIME
		}
	}
}

impl Default for Lcd {
	fn default() -> Self {
		Lcd::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn latch(lcd: &mut Lcd, rs: RegisterSelect, data: u8, now: Duration) {
		lcd.update(true, rs, Some(data), now);
		lcd.update(false, rs, Some(data), now + Duration::from_millis(5));
	}

	#[test]
	fn latches_on_falling_edge() {
		let mut lcd = Lcd::new();
		lcd.update(true, RegisterSelect::Data, Some(b'x'), Duration::from_millis(0));
		assert!(lcd.transactions().is_empty());
		lcd.update(false, RegisterSelect::Data, Some(b'x'), Duration::from_millis(1));
		assert_eq!(lcd.transactions(), &[LcdTransaction { register_select: RegisterSelect::Data, data: b'x' }][..]);
		assert_eq!(lcd.text(), "x");
	}

	#[test]
	fn wraps_first_line_into_second() {
		let mut lcd = Lcd::new();
		let mut t = Duration::from_millis(0);
		latch(&mut lcd, RegisterSelect::Instruction, SET_DDRAM_ADDRESS | 0x27, t);
		t += Duration::from_millis(10);
		latch(&mut lcd, RegisterSelect::Data, b'a', t);
		t += Duration::from_millis(10);
		latch(&mut lcd, RegisterSelect::Data, b'b', t);
		assert_eq!(lcd.ddram[0x27], b'a');
		assert_eq!(lcd.ddram[0x40], b'b');
		assert_eq!(lcd.violations(), 0);
	}

	#[test]
	fn busy_violation() {
		let mut lcd = Lcd::new();
		let t = Duration::from_millis(0);
		lcd.update(true, RegisterSelect::Instruction, Some(CLEAR), t);
		lcd.update(false, RegisterSelect::Instruction, Some(CLEAR), t);
		lcd.update(true, RegisterSelect::Data, Some(b'x'), t);
		lcd.update(false, RegisterSelect::Data, Some(b'x'), t + Duration::from_micros(100));
		assert_eq!(lcd.violations(), 1);
	}

	#[test]
	fn undriven_bus() {
		let mut lcd = Lcd::new();
		lcd.update(true, RegisterSelect::Data, None, Duration::from_millis(0));
		lcd.update(false, RegisterSelect::Data, None, Duration::from_millis(5));
		assert!(lcd.transactions().is_empty());
		assert_eq!(lcd.violations(), 1);
	}
}
