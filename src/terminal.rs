//! Terminal utilities

use crate::Result;
use nix::libc;
use std::io;
use std::os::unix::io::RawFd;

/// Whether `fd` refers to a terminal
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

/// Put a terminal into raw mode, returning the attributes to restore
///
/// Raw mode delivers every keypress immediately, so any key can stop
/// reading without waiting for Enter.
pub fn set_raw_mode(fd: RawFd) -> Result<libc::termios> {
    let mut original: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
        return Err(io::Error::last_os_error().into());
    }

    let mut raw = original;
    unsafe {
        libc::cfmakeraw(&mut raw);
        if libc::tcsetattr(fd, libc::TCSANOW, &raw) != 0 {
            return Err(io::Error::last_os_error().into());
        }
    }

    Ok(original)
}

/// Restore terminal attributes saved by `set_raw_mode`
pub fn restore_termios(fd: RawFd, termios: &libc::termios) {
    unsafe {
        libc::tcsetattr(fd, libc::TCSANOW, termios);
    }
}

/// Restores the terminal when dropped
pub struct TermiosGuard {
    fd: RawFd,
    termios: libc::termios,
}

impl TermiosGuard {
    /// Switch `fd` to raw mode until the guard is dropped
    pub fn raw(fd: RawFd) -> Result<Self> {
        let termios = set_raw_mode(fd)?;
        Ok(Self { fd, termios })
    }
}

impl Drop for TermiosGuard {
    fn drop(&mut self) {
        restore_termios(self.fd, &self.termios);
    }
}
