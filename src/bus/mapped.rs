use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::FromRawFd;
use std::path::{
	Path,
	PathBuf,
};
use std::ptr;

use libc::{
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	_SC_PAGESIZE,
	c_void,
	mmap,
	munmap,
	off_t,
	open,
	sysconf,
};

use super::{
	Bus,
	Port,
};

/// Covers the I/O registers of all ports (PINB 0x23 up to PORTF 0x31)
pub const PORT_WINDOW_LEN: usize = 0x40;

/// Port registers mapped into the process, laid out like the ATmega32U4
/// data space.
#[derive(Debug)]
pub struct MappedPorts {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
	len: usize,
	path: PathBuf,
}

impl Drop for MappedPorts {
	fn drop(&mut self) {
		unsafe {
			let res = munmap(
				self.ptr.as_ptr() as *mut c_void,
				self.len,
			);
			if 0 != res {
				error!("munmap of {:?} failed: {}", self.path, io::Error::last_os_error());
			}
		}
	}
}

impl MappedPorts {
	pub fn open(path: &Path, offset: u64) -> crate::AResult<Self> {
		with_context!(("couldn't map port registers from {:?} at 0x{:x}", path, offset), {
			Self::inner_open(path, offset)
		})
	}

	fn inner_open(path: &Path, offset: u64) -> crate::AResult<Self> {
		let page_size = unsafe { sysconf(_SC_PAGESIZE) };
		ensure!(page_size > 0, "couldn't determine page size");
		ensure!(offset % (page_size as u64) == 0, "offset not aligned to page size {}", page_size);
		ensure!(offset <= off_t::max_value() as u64, "offset too large");

		let c_path = CString::new(path.as_os_str().as_bytes())?;

		let fd = unsafe { open(c_path.as_ptr(), O_RDWR | O_CLOEXEC | O_SYNC) };
		if -1 == fd {
			return Err(io::Error::last_os_error().into());
		}
		// now get fd managed to prevent resource leak
		let _f = unsafe { fs::File::from_raw_fd(fd) };

		let area = unsafe {
			mmap(
				ptr::null_mut(),
				PORT_WINDOW_LEN,
				PROT_READ | PROT_WRITE,
				MAP_SHARED,
				fd,
				offset as off_t,
			)
		};

		if area as usize == !0usize {
			return Err(io::Error::last_os_error().into());
		}
		let ptr = ptr::NonNull::new(area as *mut u8)
			.ok_or_else(|| format_err!("mmap returned NULL"))?;

		info!("mapped port registers from {:?} at 0x{:x}", path, offset);

		Ok(MappedPorts {
			ptr,
			len: PORT_WINDOW_LEN,
			path: path.to_owned(),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_register(&self, offset: usize) -> u8 {
		assert!(offset < self.len);
		unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset)) }
	}

	fn write_register(&mut self, offset: usize, data: u8) {
		assert!(offset < self.len);
		unsafe { ptr::write_volatile(self.ptr.as_ptr().add(offset), data) }
	}
}

impl Bus for MappedPorts {
	fn set_direction(&mut self, port: Port, outputs: u8) {
		self.write_register(port.ddr_register(), outputs);
	}

	fn write_port(&mut self, port: Port, value: u8) {
		self.write_register(port.port_register(), value);
	}

	fn read_port(&mut self, port: Port) -> u8 {
		self.read_register(port.pin_register())
	}
}
