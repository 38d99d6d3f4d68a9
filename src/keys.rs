//! Byte-level key decoding, including multi-byte ESC sequences (spec
//! §4.5). The decoder is deliberately liberal: unknown escape sequences
//! are discarded rather than erroring, so the editor tolerates terminal
//! variation (spec Design Notes §9).

use std::fmt;
use std::os::fd::RawFd;

use crate::error::Result;
use crate::term;

/// A single decoded keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(u8),
    Enter,
    CtrlC,
    CtrlD,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
    CtrlT,
    CtrlL,
    CtrlK,
    CtrlU,
    CtrlW,
    CtrlA,
    CtrlE,
    CtrlB,
    CtrlF,
    CtrlP,
    CtrlN,
    Esc,
    /// A recognized-but-unhandled byte or escape sequence.
    Unknown,
}

const fn ctrl(b: u8) -> u8 {
    b & 0b0001_1111
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "'{}'", *c as char),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Read and decode one keystroke from `fd`. Returns `Ok(None)` on EOF.
pub fn read_key(fd: RawFd) -> Result<Option<Key>> {
    let Some(b) = term::read_byte(fd)? else {
        return Ok(None);
    };
    let key = decode_byte(fd, b)?;
    log::trace!("decoded key: {key}");
    Ok(Some(key))
}

/// Decode one already-read byte into a [`Key`], consuming further bytes
/// from `fd` for multi-byte ESC sequences. Exposed to `session` so the
/// completion sub-loop (which reads raw bytes per spec §4.6) can decode
/// a re-dispatch byte the same way the main loop would.
pub(crate) fn decode_byte(fd: RawFd, b: u8) -> Result<Key> {
    Ok(match b {
        0x0D => Key::Enter,
        0x7F | 0x08 => Key::Backspace,
        0x09 => Key::Tab,
        _ if b == ctrl(b'C') => Key::CtrlC,
        _ if b == ctrl(b'D') => Key::CtrlD,
        _ if b == ctrl(b'T') => Key::CtrlT,
        _ if b == ctrl(b'L') => Key::CtrlL,
        _ if b == ctrl(b'K') => Key::CtrlK,
        _ if b == ctrl(b'U') => Key::CtrlU,
        _ if b == ctrl(b'W') => Key::CtrlW,
        _ if b == ctrl(b'A') => Key::CtrlA,
        _ if b == ctrl(b'E') => Key::CtrlE,
        _ if b == ctrl(b'B') => Key::CtrlB,
        _ if b == ctrl(b'F') => Key::CtrlF,
        _ if b == ctrl(b'P') => Key::CtrlP,
        _ if b == ctrl(b'N') => Key::CtrlN,
        0x1B => decode_escape(fd)?,
        b if b >= 0x20 => Key::Char(b),
        _ => Key::Unknown,
    })
}

/// Decode the body of an ESC sequence (spec §4.5): `[`-prefixed CSI
/// sequences (letters, or digit-then-`~`), `O`-prefixed SS3 sequences,
/// or a bare ESC if nothing follows.
fn decode_escape(fd: RawFd) -> Result<Key> {
    let Some(b1) = term::read_byte(fd)? else {
        return Ok(Key::Esc);
    };
    let Some(b2) = term::read_byte(fd)? else {
        return Ok(Key::Unknown);
    };

    match b1 {
        b'[' => {
            if b2.is_ascii_digit() {
                let Some(b3) = term::read_byte(fd)? else {
                    return Ok(Key::Unknown);
                };
                if b3 == b'~' {
                    return Ok(match b2 {
                        b'1' | b'7' => Key::Home,
                        b'3' => Key::Delete,
                        b'4' | b'8' => Key::End,
                        _ => Key::Unknown,
                    });
                }
                return Ok(Key::Unknown);
            }
            Ok(match b2 {
                b'A' => Key::Up,
                b'B' => Key::Down,
                b'C' => Key::Right,
                b'D' => Key::Left,
                b'H' => Key::Home,
                b'F' => Key::End,
                _ => Key::Unknown,
            })
        }
        b'O' => Ok(match b2 {
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Unknown,
        }),
        _ => Ok(Key::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::{close, pipe, write};

    #[test]
    fn ctrl_key_masks_to_control_range() {
        assert_eq!(ctrl(b'a'), 0x01);
        assert_eq!(ctrl(b'd'), 0x04);
    }

    fn decode(bytes: &[u8]) -> Key {
        let (r, w) = pipe().unwrap();
        write(w, bytes).unwrap();
        let key = read_key(r).unwrap().expect("at least one key");
        close(r).unwrap();
        close(w).unwrap();
        key
    }

    #[test]
    fn decodes_plain_byte() {
        assert_eq!(decode(b"a"), Key::Char(b'a'));
    }

    #[test]
    fn decodes_arrow_keys() {
        assert_eq!(decode(b"\x1b[A"), Key::Up);
        assert_eq!(decode(b"\x1b[B"), Key::Down);
        assert_eq!(decode(b"\x1b[C"), Key::Right);
        assert_eq!(decode(b"\x1b[D"), Key::Left);
    }

    #[test]
    fn decodes_delete_via_csi_digit_tilde() {
        assert_eq!(decode(b"\x1b[3~"), Key::Delete);
    }

    #[test]
    fn decodes_ss3_home_end() {
        assert_eq!(decode(b"\x1bOH"), Key::Home);
        assert_eq!(decode(b"\x1bOF"), Key::End);
    }

    #[test]
    fn unknown_escape_sequence_is_discarded_not_errored() {
        assert_eq!(decode(b"\x1b[Z"), Key::Unknown);
    }
}
