//! Shared test harness: a real pty pair so the editor's raw-mode and
//! ioctl column-query paths run against an actual TTY device instead of
//! a pipe (which would trip the non-TTY fallback).

use std::os::fd::RawFd;

use nix::pty::{openpty, Winsize};
use nix::unistd::close;

pub struct Pty {
    pub master: RawFd,
    pub slave: RawFd,
}

impl Pty {
    /// Open a pty pair with a fixed 80-column window, so `get_columns`
    /// resolves via the ioctl path without falling back to the
    /// cursor-report probe (nothing on the other end would answer it).
    pub fn open() -> Self {
        let ws = Winsize {
            ws_row: 24,
            ws_col: 80,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        let result = openpty(Some(&ws), None).expect("openpty");
        Pty {
            master: result.master,
            slave: result.slave,
        }
    }

    /// Queue keystrokes for the editor to read, as if typed at the
    /// master side of the pty.
    pub fn send(&self, bytes: &[u8]) {
        write_all(self.master, bytes);
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        let _ = close(self.master);
        let _ = close(self.slave);
    }
}

fn write_all(fd: RawFd, data: &[u8]) {
    let mut written = 0;
    while written < data.len() {
        let n = unsafe {
            libc::write(
                fd,
                data[written..].as_ptr() as *const libc::c_void,
                data.len() - written,
            )
        };
        assert!(n >= 0, "write to pty failed");
        written += n as usize;
    }
}
