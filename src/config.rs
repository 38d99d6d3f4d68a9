//! Tunables the distilled spec already parameterizes (buffer and
//! history capacity) gathered into one config struct, generalizing the
//! teacher's hardcoded constants without adding new scope.

use crate::edit::BUF_MAX;
use crate::history::DEFAULT_MAX_LEN;

/// How the terminal bell is used to signal "nothing to do" (empty
/// completion list, wrap-around while cycling candidates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BellStyle {
    /// Write `\x07`.
    Audible,
    /// Never ring the bell.
    None,
}

impl Default for BellStyle {
    fn default() -> Self {
        BellStyle::Audible
    }
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Maximum usable line length in TTY mode (spec §3/§6).
    pub buf_max: usize,
    /// Default history capacity (spec §3).
    pub history_max_len: usize,
    pub bell_style: BellStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            buf_max: BUF_MAX,
            history_max_len: DEFAULT_MAX_LEN,
            bell_style: BellStyle::default(),
        }
    }
}
