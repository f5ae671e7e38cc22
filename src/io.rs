//! Stream handles and capture sinks
//!
//! Wrapped libraries write their diagnostics to C streams. This module
//! exposes the process-wide standard streams as opaque handles and provides
//! an anonymous temporary-file sink for capturing a library's output so it
//! can be read back after a call.

use std::io;

use libc::FILE;

use crate::sys;

/// The process-wide standard input stream.
#[must_use]
pub fn stdin_handle() -> *mut FILE {
	unsafe { sys::cpt_stdin() }
}

/// The process-wide standard output stream.
#[must_use]
pub fn stdout_handle() -> *mut FILE {
	unsafe { sys::cpt_stdout() }
}

/// The process-wide standard error stream.
#[must_use]
pub fn stderr_handle() -> *mut FILE {
	unsafe { sys::cpt_stderr() }
}

/// An anonymous temporary-file sink.
///
/// Backed by `tmpfile(3)`: the file has no name, and the OS reclaims it when
/// the handle is closed. Bind [`CaptureFile::handle`] to a context's `fout`
/// or `ferr` to capture what a wrapped library writes there.
#[derive(Debug)]
pub struct CaptureFile {
	file: *mut FILE,
}

impl CaptureFile {
	/// Create a new empty capture sink.
	///
	/// # Errors
	///
	/// Returns the OS error if no temporary file could be created.
	pub fn new() -> io::Result<Self> {
		let file = unsafe { libc::tmpfile() };
		if file.is_null() {
			Err(io::Error::last_os_error())
		} else {
			Ok(Self { file })
		}
	}

	/// The underlying stream handle.
	///
	/// The handle is owned by this `CaptureFile` and is closed when it is
	/// dropped; do not hand it to anything that outlives the capture.
	#[must_use]
	pub const fn handle(&self) -> *mut FILE {
		self.file
	}

	/// Read everything written to the sink so far and close it.
	///
	/// Invalid UTF-8 from the captured stream is replaced rather than
	/// rejected.
	pub fn read_and_close(self) -> io::Result<String> {
		let mut buffer = Vec::new();

		unsafe {
			libc::fflush(self.file);
			libc::rewind(self.file);
			loop {
				let c = libc::fgetc(self.file);
				if c == libc::EOF {
					break;
				}
				buffer.push(c as u8);
			}
		}

		Ok(String::from_utf8_lossy(&buffer).into_owned())
	}
}

impl Drop for CaptureFile {
	fn drop(&mut self) {
		unsafe {
			libc::fclose(self.file);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::ffi::CString;

	use super::*;

	#[test]
	fn capture_round_trip() {
		let capture = CaptureFile::new().unwrap();
		let msg = CString::new("diagnostic line\n").unwrap();

		unsafe {
			libc::fputs(msg.as_ptr(), capture.handle());
		}

		let contents = capture.read_and_close().unwrap();
		assert_eq!(contents, "diagnostic line\n");
	}

	#[test]
	fn empty_capture_reads_empty() {
		let capture = CaptureFile::new().unwrap();
		assert_eq!(capture.read_and_close().unwrap(), "");
	}
}
