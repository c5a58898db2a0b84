#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate eeprom_lcd_dump;
use eeprom_lcd_dump::*;

use std::path::Path;
use std::process::exit;
use std::time::Duration;

use eeprom_lcd_dump::bus::{
	Bus,
	MappedPorts,
};
use eeprom_lcd_dump::memory::ADDRESS_LIMIT;
use eeprom_lcd_dump::operations::RunOptions;
use eeprom_lcd_dump::sim::SimulatedBus;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(None),
	};
	param.parse::<T>().map(Some).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_address(matches: &clap::ArgMatches, name: &str, default: u16) -> AResult<u16> {
	match matches.value_of(name) {
		None => Ok(default),
		Some(p) => parse_hex_u16(p).map_err(|e| format_err!("invalid parameter {}: {}", name, e)),
	}
}

fn get_range(matches: &clap::ArgMatches) -> AResult<(u16, u16)> {
	let start = get_address(matches, "START", 0)?;
	let end = get_address(matches, "END", ADDRESS_LIMIT)?;
	Ok((start, end))
}

fn run_options(sub_m: Option<&clap::ArgMatches>) -> AResult<RunOptions> {
	let mut options = RunOptions::default();
	if let Some(sub_m) = sub_m {
		let (start, end) = get_range(sub_m)?;
		options.start = start;
		options.end = end;
		options.program = sub_m.is_present("program");
		options.verify = sub_m.is_present("verify");
	}
	Ok(options)
}

fn read_memory<B: Bus>(board: &mut Board<B>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let (start, end) = get_range(sub_m)?;
	ensure!(start <= end, "invalid range 0x{:03x}..0x{:03x}", start, end);

	let mut image = vec![0u8; (end - start) as usize];
	board.memory().init();
	board.memory().read_into(start, &mut image)?;
	for (address, data) in (start..).zip(image) {
		println!("@{:03x}: {:02x}", address, data);
	}

	Ok(())
}

fn program<B: Bus>(board: &mut Board<B>, sub_m: &clap::ArgMatches) -> AResult<()> {
	board.memory().init();
	operations::program_fixed_pattern(board);
	if sub_m.is_present("verify") {
		operations::verify_pattern(board)?;
	}
	Ok(())
}

fn execute<B: Bus>(board: &mut Board<B>, matches: &clap::ArgMatches) -> AResult<()> {
	match matches.subcommand() {
		("", _) => {
			operations::run(board, &run_options(None)?)
		},
		("run", sub_m) => {
			operations::run(board, &run_options(sub_m)?)
		},
		("dump", sub_m) => {
			operations::run(board, &run_options(sub_m)?)
		},
		("program", Some(sub_m)) => {
			program(board, sub_m)
		},
		("read", Some(sub_m)) => {
			read_memory(board, sub_m)
		},
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg simulate: -s --simulate "use a simulated board instead of real hardware")
		(@arg DEVICE: -d --device +takes_value "file to map the port registers from")
		(@arg OFFSET: --offset +takes_value "offset of the port register window in DEVICE (hex)")
		(@arg PAUSE: --pause +takes_value "pause before each dump page in milliseconds")
		(@subcommand run =>
			(about: "initialize, optionally program the memory, dump it to the display (default)")
			(@arg program: -p --program "program the test pattern before dumping")
			(@arg verify: --verify "verify the test pattern after programming")
			(@arg START: --start +takes_value "first address to dump (hex)")
			(@arg END: --end +takes_value "address to stop the dump at (hex)")
		)
		(@subcommand dump =>
			(about: "dump memory to the display")
			(@arg START: --start +takes_value "first address to dump (hex)")
			(@arg END: --end +takes_value "address to stop the dump at (hex)")
		)
		(@subcommand program =>
			(about: "program the test pattern")
			(@arg verify: --verify "verify the test pattern after programming")
		)
		(@subcommand read =>
			(about: "read memory and print it to stdout")
			(@arg START: --start +takes_value "first address to read (hex)")
			(@arg END: --end +takes_value "address to stop reading at (hex)")
		)
	).get_matches();

	let mut timing = Timing::default();
	if let Some(ms) = get_param::<u64>(&matches, "PAUSE")? {
		timing = timing.with_page_pause(Duration::from_millis(ms));
	}

	if matches.is_present("simulate") {
		ensure!(!matches.is_present("DEVICE"), "--simulate and --device are exclusive");

		let mut board = Board::new(SimulatedBus::new(), timing);
		let res = execute(&mut board, &matches);

		let sim = board.into_bus();
		for row in sim.lcd().rows() {
			info!("lcd |{}|", row);
		}
		if sim.contention() != 0 || sim.eeprom().violations() != 0 || sim.lcd().violations() != 0 {
			warn!(
				"protocol problems: {} bus contentions, {} memory violations, {} display violations",
				sim.contention(), sim.eeprom().violations(), sim.lcd().violations(),
			);
		}
		return res;
	}

	let device = match matches.value_of("DEVICE") {
		Some(d) => d,
		None => bail!("need either --device or --simulate"),
	};
	let offset = match matches.value_of("OFFSET") {
		None => 0,
		Some(o) => u64::from_str_radix(o.trim_start_matches("0x"), 16)
			.map_err(|e| format_err!("invalid parameter OFFSET: {}", e))?,
	};
	let ports = MappedPorts::open(Path::new(device), offset)?;
	let mut board = Board::new(ports, timing);
	execute(&mut board, &matches)
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
