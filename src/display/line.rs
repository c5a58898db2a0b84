use std::fmt;
use std::str;

use super::DISPLAY_WIDTH;

pub const LINE_CAPACITY: usize = DISPLAY_WIDTH;

/// Fixed size text buffer for one display line.
///
/// Formatting into it never fails: text beyond `LINE_CAPACITY` bytes is
/// dropped (never splitting a character) and `is_truncated` is set. The
/// byte after the text is always NUL.
pub struct LineBuffer {
	buf: [u8; LINE_CAPACITY + 1],
	len: usize,
	truncated: bool,
}

impl LineBuffer {
	pub fn new() -> Self {
		LineBuffer {
			buf: [0u8; LINE_CAPACITY + 1],
			len: 0,
			truncated: false,
		}
	}

	pub fn format(args: fmt::Arguments) -> Self {
		let mut line = LineBuffer::new();
		// our `write_str` never fails
		let _ = fmt::write(&mut line, args);
		line
	}

	pub fn clear(&mut self) {
		self.buf = [0u8; LINE_CAPACITY + 1];
		self.len = 0;
		self.truncated = false;
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		0 == self.len
	}

	pub fn is_truncated(&self) -> bool {
		self.truncated
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.buf[..self.len]
	}

	pub fn as_bytes_with_nul(&self) -> &[u8] {
		&self.buf[..self.len + 1]
	}

	pub fn as_str(&self) -> &str {
		// only whole characters are ever copied in
		str::from_utf8(self.as_bytes()).unwrap_or("")
	}
}

impl Default for LineBuffer {
	fn default() -> Self {
		LineBuffer::new()
	}
}

impl fmt::Write for LineBuffer {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		let room = LINE_CAPACITY - self.len;
		let mut take = s.len().min(room);
		while !s.is_char_boundary(take) {
			take -= 1;
		}
		if take < s.len() {
			self.truncated = true;
		}
		self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
		self.len += take;
		self.buf[self.len] = 0;
		Ok(())
	}
}

impl fmt::Debug for LineBuffer {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{:?}", self.as_str())?;
		if self.truncated { write!(f, " [TRUNCATED]")?; }
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use std::fmt::Write;

	use super::*;

	#[test]
	fn fits() {
		let line = LineBuffer::format(format_args!("0x{:04x}: {:02x} ", 0x7f0, 0xb0));
		assert_eq!(line.as_str(), "0x07f0: b0 ");
		assert!(!line.is_truncated());
		assert_eq!(line.as_bytes_with_nul().last(), Some(&0u8));
	}

	#[test]
	fn exactly_full() {
		let line = LineBuffer::format(format_args!("{}", "a".repeat(LINE_CAPACITY)));
		assert_eq!(line.len(), LINE_CAPACITY);
		assert!(!line.is_truncated());
		assert_eq!(line.as_bytes_with_nul()[LINE_CAPACITY], 0);
	}

	#[test]
	fn truncates_silently() {
		let line = LineBuffer::format(format_args!("{:04x}{:04x}{:04x}{:04x}{:04x}{:04x}", 1, 2, 3, 4, 5, 6));
		assert_eq!(line.as_str(), "00010002000300040005");
		assert!(line.is_truncated());
		assert_eq!(line.as_bytes_with_nul().len(), LINE_CAPACITY + 1);
		assert_eq!(line.as_bytes_with_nul()[LINE_CAPACITY], 0);
	}

	#[test]
	fn truncates_on_char_boundary() {
		let mut line = LineBuffer::new();
		write!(line, "{}", "x".repeat(LINE_CAPACITY - 1)).unwrap();
		write!(line, "ä").unwrap();
		assert_eq!(line.len(), LINE_CAPACITY - 1);
		assert!(line.is_truncated());
		assert_eq!(line.as_str(), "x".repeat(LINE_CAPACITY - 1));
	}

	#[test]
	fn clear_resets() {
		let mut line = LineBuffer::format(format_args!("{}", "y".repeat(30)));
		assert!(line.is_truncated());
		line.clear();
		assert!(line.is_empty());
		assert!(!line.is_truncated());
		write!(line, "ok").unwrap();
		assert_eq!(line.as_str(), "ok");
	}
}
