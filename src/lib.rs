#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod board;
pub mod bus;
pub mod display;
pub mod memory;
pub mod operations;
pub mod sim;
pub mod timing;

pub use self::board::Board;
pub use self::timing::Timing;

/// Parse a hexadecimal number with optional "0x" prefix
pub fn parse_hex_u16(s: &str) -> AResult<u16> {
	let digits = if s.starts_with("0x") || s.starts_with("0X") {
		&s[2..]
	} else {
		s
	};
	ensure!(!digits.is_empty(), "empty hex number: {:?}", s);
	with_context!(("invalid hex number {:?}", s),
		Ok(u16::from_str_radix(digits, 16)?)
	)
}

#[cfg(test)]
mod test {
	use super::parse_hex_u16;

	#[test]
	fn parse_hex() {
		assert_eq!(parse_hex_u16("0x7f0").unwrap(), 0x7f0);
		assert_eq!(parse_hex_u16("0X800").unwrap(), 0x800);
		assert_eq!(parse_hex_u16("10").unwrap(), 0x10);
		assert!(parse_hex_u16("").is_err());
		assert!(parse_hex_u16("0x").is_err());
		assert!(parse_hex_u16("0xg").is_err());
		assert!(parse_hex_u16("10000").is_err());
	}
}
