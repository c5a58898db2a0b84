use std::time::Duration;

/// Minimum hold times for both peripherals
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Timing {
	/// EEPROM access time after driving address and control lines; also
	/// used for the write pulse and the write recovery
	pub memory_access: Duration,
	/// how long E stays high on a display transaction
	pub display_setup: Duration,
	/// extra time the display needs to execute a clear
	pub clear_settle: Duration,
	/// pause before starting a new page of the dump
	pub page_pause: Duration,
}

impl Default for Timing {
	fn default() -> Self {
		Timing {
			memory_access: Duration::from_millis(1),
			display_setup: Duration::from_millis(5),
			clear_settle: Duration::from_millis(10),
			page_pause: Duration::from_secs(1),
		}
	}
}

impl Timing {
	pub fn with_page_pause(mut self, page_pause: Duration) -> Self {
		self.page_pause = page_pause;
		self
	}
}
