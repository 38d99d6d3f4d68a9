//! Terminal I/O: raw-mode enable/disable, column query, byte-level
//! read/write (spec §4.1).

use std::io::{self, Read};
use std::mem;
use std::os::fd::RawFd;

use libc::{c_ushort, TIOCGWINSZ};
use nix::libc::{VMIN, VTIME};
use nix::sys::termios::{
    tcgetattr, tcsetattr, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, Termios,
};

use crate::error::{Error, Result};

nix::ioctl_read_bad!(read_winsize, TIOCGWINSZ, WinSize);

#[derive(Debug)]
#[repr(C)]
struct WinSize {
    ws_row: c_ushort,
    ws_col: c_ushort,
    ws_xpixel: c_ushort,
    ws_ypixel: c_ushort,
}

/// Terminal names known not to support raw-mode editing at all.
const UNSUPPORTED_TERM: [&str; 3] = ["dumb", "cons25", "emacs"];

/// Case-insensitive match of `$TERM` against the unsupported list.
pub fn is_unsupported_term() -> bool {
    match std::env::var("TERM") {
        Ok(term) => UNSUPPORTED_TERM.iter().any(|t| t.eq_ignore_ascii_case(&term)),
        Err(_) => false,
    }
}

/// Whether `fd` refers to a TTY.
pub fn is_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

/// RAII guard around raw mode: restores the original termios on drop so
/// every exit path, including panics, leaves the terminal sane.
pub struct RawModeGuard {
    in_fd: RawFd,
    orig: Termios,
    active: bool,
}

impl RawModeGuard {
    /// Snapshot `in_fd`'s termios and switch it into raw mode.
    ///
    /// Fails with [`Error::NotATerminal`] if `in_fd` is not a TTY.
    pub fn enable(in_fd: RawFd) -> Result<Self> {
        if !is_tty(in_fd) {
            return Err(Error::NotATerminal);
        }
        let orig = tcgetattr(in_fd)?;
        let mut raw = orig.clone();

        raw.input_flags &= !(InputFlags::BRKINT
            | InputFlags::ICRNL
            | InputFlags::INPCK
            | InputFlags::ISTRIP
            | InputFlags::IXON);
        raw.output_flags &= !OutputFlags::OPOST;
        raw.control_flags |= ControlFlags::CS8;
        raw.local_flags &=
            !(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG);
        raw.control_chars[VMIN] = 1;
        raw.control_chars[VTIME] = 0;

        tcsetattr(in_fd, SetArg::TCSAFLUSH, &raw)?;
        log::trace!("raw mode enabled on fd {in_fd}");
        Ok(RawModeGuard {
            in_fd,
            orig,
            active: true,
        })
    }

    /// Idempotent: restores the snapshotted termios only if still active.
    /// Errors are swallowed because this may run during process exit.
    pub fn disable(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = tcsetattr(self.in_fd, SetArg::TCSAFLUSH, &self.orig) {
            log::warn!("failed to restore termios on fd {}: {e}", self.in_fd);
        }
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.disable();
    }
}

/// Query the terminal width in columns.
///
/// Tries a `TIOCGWINSZ` ioctl on `out_fd` first; if that reports zero
/// columns or fails, falls back to the cursor-position-report probe.
/// Returns 80 if both methods fail.
pub fn get_columns(in_fd: RawFd, out_fd: RawFd) -> usize {
    unsafe {
        let mut size: WinSize = mem::zeroed();
        if read_winsize(out_fd, &mut size).is_ok() && size.ws_col != 0 {
            return size.ws_col as usize;
        }
    }
    probe_columns(in_fd, out_fd).unwrap_or(80)
}

/// ESC-based fallback: query cursor column, move to the far right, query
/// again, then restore the cursor to where it was.
fn probe_columns(in_fd: RawFd, out_fd: RawFd) -> Option<usize> {
    let start = query_cursor_column(in_fd, out_fd)?;
    write_raw(out_fd, b"\x1b[999C").ok()?;
    let end = query_cursor_column(in_fd, out_fd)?;
    if end > start {
        let _ = write_raw(out_fd, format!("\x1b[{}D", end - start).as_bytes());
    }
    Some(end)
}

fn query_cursor_column(in_fd: RawFd, out_fd: RawFd) -> Option<usize> {
    write_raw(out_fd, b"\x1b[6n").ok()?;
    let mut buf = [0u8; 32];
    let mut n = 0;
    while n < buf.len() - 1 {
        let b = read_byte(in_fd).ok()??;
        buf[n] = b;
        n += 1;
        if b == b'R' {
            break;
        }
    }
    let reply = std::str::from_utf8(&buf[..n]).ok()?;
    let rest = reply.strip_prefix("\x1b[")?;
    let (_rows, cols) = rest.trim_end_matches('R').split_once(';')?;
    cols.parse().ok()
}

/// Read exactly one byte from `fd`. Returns `Ok(None)` on EOF (read of 0).
pub fn read_byte(fd: RawFd) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        let n = unsafe {
            libc::read(
                fd,
                byte.as_mut_ptr() as *mut libc::c_void,
                1,
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(Error::Io(err));
        }
        return Ok(if n == 0 { None } else { Some(byte[0]) });
    }
}

/// Write `data` to `fd` in full, without taking ownership of the fd.
pub fn write_raw(fd: RawFd, data: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < data.len() {
        let n = unsafe {
            libc::write(
                fd,
                data[written..].as_ptr() as *const libc::c_void,
                data.len() - written,
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(Error::Io(err));
        }
        written += n as usize;
    }
    Ok(())
}

/// Sound a terminal bell.
pub fn bell(fd: RawFd) {
    let _ = write_raw(fd, b"\x07");
}

/// Adapts a raw fd the caller does not own into a [`Read`] source, one
/// byte at a time, for the non-TTY fallback path.
pub struct FdReader(pub RawFd);

impl Read for FdReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match read_byte(self.0) {
            Ok(Some(b)) => {
                buf[0] = b;
                Ok(1)
            }
            Ok(None) => Ok(0),
            Err(Error::Io(e)) => Err(e),
            Err(_) => Err(io::Error::new(io::ErrorKind::Other, "unexpected error reading fd")),
        }
    }
}

/// A blocking, line-buffered fallback read used for non-TTY input and
/// the "dumb terminal" path: no editing, just echo the prompt and read a
/// line with `Read`.
pub fn read_line_fallback<R: Read>(mut input: R) -> io::Result<Option<String>> {
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => {
                return Ok(if out.is_empty() {
                    None
                } else {
                    Some(String::from_utf8_lossy(&out).into_owned())
                })
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    if out.last() == Some(&b'\r') {
                        out.pop();
                    }
                    return Ok(Some(String::from_utf8_lossy(&out).into_owned()));
                }
                out.push(byte[0]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
