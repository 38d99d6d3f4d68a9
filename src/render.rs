//! Single-line and multi-line refresh algorithms, and hint rendering
//! (spec §4.3).

use crate::buffer::OutputBuffer;

/// Ghost text shown to the right of the buffer (spec §4.3/Glossary).
pub struct Hint {
    pub text: String,
    /// ANSI foreground color code, or -1 for "no color".
    pub color: i32,
    pub bold: bool,
}

/// Render memo carried across refreshes so multi-line mode can erase the
/// previous render (spec §3 "Render memo").
#[derive(Default)]
pub struct RenderState {
    pub oldpos: usize,
    pub maxrows: usize,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.oldpos = 0;
        self.maxrows = 0;
    }
}

/// Single-line refresh: compute a visible window so `prompt + visible`
/// fits in `cols` with the cursor in-frame, then emit the full escape
/// sequence in one shot.
pub fn refresh_single_line(
    out: &mut OutputBuffer,
    prompt: &[u8],
    buf: &[u8],
    pos: usize,
    cols: usize,
    hint: Option<&Hint>,
) {
    let plen = prompt.len();

    // Guard against the window-sliding underflow the spec flags: when the
    // prompt alone exceeds `cols` there is no room to show any buffer.
    let (start, vis_len, cursor_rel) = if plen >= cols {
        (buf.len(), 0, 0)
    } else {
        let mut start = 0usize;
        let mut vis_len = buf.len();
        let mut cursor_rel = pos;
        while plen + cursor_rel >= cols && vis_len > 0 {
            start += 1;
            vis_len -= 1;
            cursor_rel -= 1;
        }
        while plen + vis_len > cols && vis_len > 0 {
            vis_len -= 1;
        }
        (start, vis_len, cursor_rel)
    };

    out.append_bytes(b"\r");
    out.append_bytes(prompt);
    out.append_bytes(&buf[start..start + vis_len]);
    render_hint(out, hint, plen + buf.len(), cols);
    out.append_bytes(b"\x1b[0K");
    out.append_bytes(b"\r");
    out.append_bytes(format!("\x1b[{}C", plen + cursor_rel).as_bytes());
}

/// Multi-line refresh: erase the previously rendered rows (tracked via
/// `state`), then draw the prompt, buffer and hint, wrapping to however
/// many rows the terminal width requires.
pub fn refresh_multi_line(
    out: &mut OutputBuffer,
    prompt: &[u8],
    buf: &[u8],
    pos: usize,
    cols: usize,
    hint: Option<&Hint>,
    state: &mut RenderState,
) {
    let plen = prompt.len();
    let cols = cols.max(1);

    let mut rows = (plen + buf.len()).div_ceil(cols).max(1);
    let rpos = (plen + state.oldpos) / cols;
    let old_maxrows = state.maxrows;
    state.maxrows = state.maxrows.max(rows);

    if old_maxrows > rpos {
        out.append_bytes(format!("\x1b[{}B", old_maxrows - rpos).as_bytes());
    }
    for _ in 0..old_maxrows.saturating_sub(1) {
        out.append_bytes(b"\r\x1b[0K\x1b[1A");
    }
    out.append_bytes(b"\r\x1b[0K");

    out.append_bytes(prompt);
    out.append_bytes(buf);
    render_hint(out, hint, plen + buf.len(), usize::MAX);

    if pos == buf.len() && (pos + plen) % cols == 0 {
        out.append_bytes(b"\n\r");
        rows += 1;
        state.maxrows = state.maxrows.max(rows);
    }

    let rpos2 = (plen + pos) / cols;
    if rows > rpos2 {
        out.append_bytes(format!("\x1b[{}A", rows - rpos2).as_bytes());
    }
    let col = (plen + pos) % cols;
    if col > 0 {
        out.append_bytes(format!("\r\x1b[{col}C").as_bytes());
    } else {
        out.append_bytes(b"\r");
    }

    state.oldpos = pos;
}

/// Render the hint to the right of the buffer, truncated to fit within
/// `cols` (spec §4.3). `used` is the number of columns already consumed
/// by prompt + buffer; pass `usize::MAX` for "no limit" (multi-line mode
/// renders hints unconditionally).
fn render_hint(out: &mut OutputBuffer, hint: Option<&Hint>, used: usize, cols: usize) {
    let Some(hint) = hint else { return };
    if used >= cols {
        return;
    }
    let budget = cols.saturating_sub(used);
    let text = if hint.text.len() > budget {
        // Truncate on a char boundary at or before `budget` so a
        // multi-byte character straddling the cut point is dropped
        // whole rather than panicking on a mid-character byte slice.
        let mut end = budget;
        while end > 0 && !hint.text.is_char_boundary(end) {
            end -= 1;
        }
        &hint.text[..end]
    } else {
        &hint.text
    };
    let styled = hint.color >= 0 || hint.bold;
    if styled {
        // A bold hint with no explicit color defaults to white (37)
        // rather than SGR 0, which would reset the bold just set in the
        // same escape sequence.
        let color = if hint.color < 0 && hint.bold { 37 } else { hint.color.max(0) };
        out.append_bytes(format!("\x1b[{};{color};49m", hint.bold as u8).as_bytes());
    }
    out.append_bytes(text.as_bytes());
    if styled {
        out.append_bytes(b"\x1b[0m");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_window_slides_to_keep_cursor_in_frame() {
        let mut out = OutputBuffer::new();
        let prompt = b"> ";
        let buf = b"0123456789012345"; // 16 bytes
        refresh_single_line(&mut out, prompt, buf, buf.len(), 10, None);
        // Window must slide since plen(2)+pos(16) >= cols(10).
        assert!(!out.is_empty());
    }

    #[test]
    fn single_line_guards_prompt_wider_than_cols() {
        let mut out = OutputBuffer::new();
        let prompt = b"0123456789012";
        refresh_single_line(&mut out, prompt, b"abc", 1, 5, None);
        // Must not panic on underflow; produced some output.
        assert!(!out.is_empty());
    }

    #[test]
    fn bold_hint_with_no_color_defaults_to_white_instead_of_reset() {
        let mut out = OutputBuffer::new();
        let hint = Hint { text: "x".to_string(), color: -1, bold: true };
        refresh_single_line(&mut out, b"> ", b"", 0, 80, Some(&hint));
        let rendered = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        // Must not emit "\x1b[1;0;49m" (SGR 0 would reset the bold just set).
        assert!(rendered.contains("\x1b[1;37;49m"));
        assert!(!rendered.contains("\x1b[1;0;49m"));
    }

    #[test]
    fn hint_truncation_does_not_split_a_multibyte_char() {
        let mut out = OutputBuffer::new();
        // "café" with plain ASCII buffer leaving a budget that lands
        // inside the 2-byte 'é' (0xC3 0xA9) if sliced by raw byte index.
        let hint = Hint { text: "café".to_string(), color: -1, bold: false };
        refresh_single_line(&mut out, b"", b"abc", 3, 7, Some(&hint));
        // Must not panic; the rendered hint text is valid UTF-8.
        assert!(!out.is_empty());
    }

    #[test]
    fn multi_line_tracks_oldpos() {
        let mut out = OutputBuffer::new();
        let mut state = RenderState::new();
        refresh_multi_line(&mut out, b"> ", b"hello", 5, 10, None, &mut state);
        assert_eq!(state.oldpos, 5);
        assert!(state.maxrows >= 1);
    }
}
