use crate::board::Board;
use crate::bus::Bus;
use crate::memory::ADDRESS_LIMIT;

/// Addresses shown per display page
pub const PAGE_SIZE: u16 = 8;
/// Addresses per group; each group starts with the address
pub const GROUP_SIZE: u16 = 4;

pub const PATTERN_OFFSET: u16 = 0x7f0;

/// Test program for an 8155 style peripheral interface chip, placed just
/// below the top of memory; everything else is zero.
// - 0x7f0: b0 90    command/status register <- 0x90
// - 0x7f2: e6 03    port A <- 0x03
// - 0x7f4: b0 01    command/status register <- 0x01
// - 0x7f6: e6 01    port A <- 0x01
pub const PATTERN: [u8; 8] = [
	0xb0, 0x90, 0xe6, 0x03,
	0xb0, 0x01, 0xe6, 0x01,
];

/// Expected memory byte after `program_fixed_pattern`
pub fn pattern_byte(address: u16) -> u8 {
	let offset = address.wrapping_sub(PATTERN_OFFSET) as usize;
	if offset < PATTERN.len() {
		PATTERN[offset]
	} else {
		0x00
	}
}

fn check_dump_range(start: u16, end: u16) -> crate::AResult<()> {
	ensure!(start <= end, "invalid dump range 0x{:04x}..0x{:04x}: start after end", start, end);
	ensure!(end <= ADDRESS_LIMIT, "invalid dump range 0x{:04x}..0x{:04x}: end beyond memory size 0x{:04x}", start, end, ADDRESS_LIMIT);
	ensure!(0 == start % PAGE_SIZE && 0 == end % PAGE_SIZE,
		"invalid dump range 0x{:04x}..0x{:04x}: not aligned to pages of {} bytes", start, end, PAGE_SIZE
	);
	Ok(())
}

/// Show memory `start..end` as hex, one page of 8 bytes at a time.
///
/// Each page waits for `page_pause` and clears the display first.
pub fn dump<B: Bus>(board: &mut Board<B>, start: u16, end: u16) -> crate::AResult<()> {
	check_dump_range(start, end)?;
	info!("dumping 0x{:04x}..0x{:04x}", start, end);

	let page_pause = board.timing().page_pause;
	for address in start..end {
		if 0 == address % PAGE_SIZE {
			board.wait(page_pause);
			board.display().clear();
			debug!("page 0x{:04x}", address);
		}
		let data = board.memory().read(address);
		if 0 == address % GROUP_SIZE {
			board.display().print_fmt(format_args!("0x{:04x}: {:02x} ", address, data));
		} else {
			board.display().print_fmt(format_args!("{:02x} ", data));
		}
	}

	Ok(())
}

/// Write the test pattern, zeroing all other memory; no verification.
pub fn program_fixed_pattern<B: Bus>(board: &mut Board<B>) {
	info!("programming {} bytes", ADDRESS_LIMIT);
	let mut memory = board.memory();
	for address in 0..ADDRESS_LIMIT {
		memory.write(address, pattern_byte(address));
	}
	info!("programming done");
}

/// Read back the whole memory and compare with the pattern
pub fn verify_pattern<B: Bus>(board: &mut Board<B>) -> crate::AResult<()> {
	let mut image = vec![0u8; ADDRESS_LIMIT as usize];
	board.memory().read_into(0, &mut image)?;
	for (address, &data) in (0u16..).zip(image.iter()) {
		let expected = pattern_byte(address);
		ensure!(data == expected,
			"Verify failed at {:03x}: expected {:02x}, memory is {:02x}", address, expected, data
		);
	}
	info!("pattern verified");
	Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RunOptions {
	pub program: bool,
	pub verify: bool,
	pub start: u16,
	pub end: u16,
}

impl Default for RunOptions {
	fn default() -> Self {
		RunOptions {
			program: false,
			verify: false,
			start: 0,
			end: ADDRESS_LIMIT,
		}
	}
}

/// Whole program: set up both chips, optionally program the memory, then
/// dump it.
pub fn run<B: Bus>(board: &mut Board<B>, options: &RunOptions) -> crate::AResult<()> {
	// fail before touching any hardware
	check_dump_range(options.start, options.end)?;

	board.memory().init();
	board.display().init();

	if options.program {
		program_fixed_pattern(board);
		if options.verify {
			verify_pattern(board)?;
		}
	}

	dump(board, options.start, options.end)
}
