//! `Editor`: the public session type (spec §3 `EditorSession`, §6
//! External Interfaces). Per Design Note §9, completion/hint callbacks
//! live on the session instead of as process-wide statics, so two
//! editors can coexist in one process.

use std::os::fd::RawFd;
use std::path::Path;

use crate::completion::Completions;
use crate::config::{BellStyle, EditorConfig};
use crate::edit::{HistoryDirection, LineBuffer};
use crate::error::{Error, Result};
use crate::history::History;
use crate::keys::{self, Key};
use crate::render::{self, Hint, RenderState};
use crate::term::{self, RawModeGuard};

pub type CompletionCallback = Box<dyn FnMut(&str, &mut Completions)>;
pub type HintsCallback = Box<dyn FnMut(&str) -> Option<Hint>>;
pub type FreeHintsCallback = Box<dyn FnMut(String)>;

enum Flow {
    Continue,
    Return(String),
}

/// One interactive editing session: owns the file descriptors, the edit
/// buffer, the history store and the host's callbacks (spec §3).
pub struct Editor {
    in_fd: RawFd,
    out_fd: RawFd,
    #[allow(dead_code)] // kept for parity with the spec's 3-fd session; diagnostics are not emitted by the core yet.
    err_fd: RawFd,

    prompt: String,
    buffer: LineBuffer,
    cols: usize,
    multiline: bool,
    render_state: RenderState,

    history: History,
    history_index: usize,
    saved_buffer: String,
    /// Per-session scratch copies of browsed history entries, indexed the
    /// same way as `History::get` (spec §4.4 `history_next`: edits made
    /// while browsing are written back into the slot being left, not
    /// just discarded in favor of the pristine stored entry).
    history_overlay: Vec<Option<String>>,

    raw_guard: Option<RawModeGuard>,

    completion_cb: Option<CompletionCallback>,
    hints_cb: Option<HintsCallback>,
    free_hints_cb: Option<FreeHintsCallback>,

    config: EditorConfig,
}

impl Editor {
    /// Create a session over the given file descriptors and prompt
    /// (spec §6 `create`). Column width is queried once per `read_line`
    /// call, right after raw mode is entered, and held fixed for the
    /// rest of that call (not live-refreshed on SIGWINCH).
    pub fn new(in_fd: RawFd, out_fd: RawFd, err_fd: RawFd, prompt: impl Into<String>) -> Self {
        Self::with_config(in_fd, out_fd, err_fd, prompt, EditorConfig::default())
    }

    pub fn with_config(
        in_fd: RawFd,
        out_fd: RawFd,
        err_fd: RawFd,
        prompt: impl Into<String>,
        config: EditorConfig,
    ) -> Self {
        Editor {
            in_fd,
            out_fd,
            err_fd,
            prompt: prompt.into(),
            buffer: LineBuffer::new(config.buf_max),
            // Queried fresh at the start of each `read_line` call, once
            // raw mode is active — the ESC-probe fallback needs
            // non-canonical reads to see the cursor-report reply without
            // blocking on a newline that will never come. 80 is only a
            // placeholder until the first `read_line`.
            cols: 80,
            multiline: false,
            render_state: RenderState::new(),
            history: History::new(config.history_max_len),
            history_index: 0,
            saved_buffer: String::new(),
            history_overlay: Vec::new(),
            raw_guard: None,
            completion_cb: None,
            hints_cb: None,
            free_hints_cb: None,
            config,
        }
    }

    pub fn set_multiline(&mut self, on: bool) {
        self.multiline = on;
    }

    pub fn set_completion_callback(&mut self, cb: CompletionCallback) {
        self.completion_cb = Some(cb);
    }

    pub fn set_hints_callback(&mut self, cb: HintsCallback) {
        self.hints_cb = Some(cb);
    }

    pub fn set_free_hints_callback(&mut self, cb: FreeHintsCallback) {
        self.free_hints_cb = Some(cb);
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Write the "clear screen" escape sequence (spec §6).
    pub fn clear_screen(&self) {
        let _ = term::write_raw(self.out_fd, b"\x1b[H\x1b[2J");
    }

    pub fn history_add(&mut self, line: impl Into<String>) -> bool {
        self.history.add(line)
    }

    pub fn history_set_max_len(&mut self, n: usize) -> Result<()> {
        self.history.set_max_len(n)
    }

    pub fn history_save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.history.save(path)
    }

    pub fn history_load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.history.load(path)
    }

    /// Debug helper: echo hex codes for each keystroke until the literal
    /// bytes `q u i t` arrive as the last four bytes typed (spec §6).
    pub fn print_key_codes(&mut self) -> Result<()> {
        term::write_raw(
            self.out_fd,
            b"Type keys to see hex codes, type 'quit' to exit.\r\n",
        )?;
        let _guard = RawModeGuard::enable(self.in_fd)?;
        let mut last4 = [0u8; 4];
        loop {
            let Some(b) = term::read_byte(self.in_fd)? else {
                break;
            };
            let printable = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            let msg = format!("'{printable}' ({b:#04x})\r\n");
            let _ = term::write_raw(self.out_fd, msg.as_bytes());
            last4 = [last4[1], last4[2], last4[3], b];
            if &last4 == b"quit" {
                break;
            }
        }
        Ok(())
    }

    /// Idempotent teardown: disables raw mode if engaged. Safe to call
    /// more than once, and safe to register for the host to run at
    /// process exit (spec §5 resource policy).
    pub fn restore(&mut self) {
        if let Some(mut guard) = self.raw_guard.take() {
            guard.disable();
        }
    }

    /// Read one line interactively (spec §6 `read_line`). Falls back to
    /// a plain blocking read with no editing when stdin is not a TTY,
    /// or `$TERM` names a terminal known not to support raw mode (spec
    /// §4.1, boundary scenario 8).
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompt = prompt.to_string();

        // TTY-absent fallback: a plain line read from a pipe, no prompt
        // (spec §4.1) — a piped host typically doesn't want prompt bytes
        // mixed into its output stream.
        if !term::is_tty(self.in_fd) {
            return term::read_line_fallback(term::FdReader(self.in_fd))
                .map_err(Error::Io)?
                .ok_or(Error::EndOfFile);
        }

        // "Dumb terminal" fallback: a real TTY that can't do raw-mode
        // editing gets a prompt plus a blocking, un-edited read (spec
        // §4.1, boundary scenario 8).
        if term::is_unsupported_term() {
            term::write_raw(self.out_fd, self.prompt.as_bytes())?;
            return term::read_line_fallback(term::FdReader(self.in_fd))
                .map_err(Error::Io)?
                .ok_or(Error::EndOfFile);
        }

        self.buffer.clear();
        self.history_index = 0;
        self.saved_buffer.clear();
        self.history_overlay = vec![None; self.history.len()];
        self.render_state.reset();

        let guard = RawModeGuard::enable(self.in_fd)?;
        self.raw_guard = Some(guard);
        self.cols = term::get_columns(self.in_fd, self.out_fd);

        term::write_raw(self.out_fd, self.prompt.as_bytes())?;

        let outcome = self.edit_loop();

        self.restore();
        let _ = term::write_raw(self.out_fd, b"\n");
        outcome
    }

    fn edit_loop(&mut self) -> Result<String> {
        loop {
            let Some(key) = keys::read_key(self.in_fd)? else {
                return Err(Error::EndOfFile);
            };
            match self.handle_key(key)? {
                Flow::Continue => {}
                Flow::Return(line) => return Ok(line),
            }
        }
    }

    fn handle_key(&mut self, key: Key) -> Result<Flow> {
        match key {
            Key::Enter => {
                if self.multiline {
                    self.buffer.move_end();
                }
                if self.hints_cb.is_some() {
                    self.refresh_line_without_hints();
                }
                Ok(Flow::Return(self.buffer.as_str().to_string()))
            }
            Key::CtrlC => Err(Error::Interrupted),
            Key::CtrlD => {
                if self.buffer.is_empty() {
                    return Err(Error::EndOfFile);
                }
                self.buffer.delete();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::Backspace => {
                self.buffer.backspace();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::Delete => {
                self.buffer.delete();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::Left | Key::CtrlB => {
                self.buffer.move_left();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::Right | Key::CtrlF => {
                self.buffer.move_right();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::Home | Key::CtrlA => {
                self.buffer.move_home();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::End | Key::CtrlE => {
                self.buffer.move_end();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::CtrlK => {
                self.buffer.kill_to_end();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::CtrlU => {
                self.buffer.kill_line();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::CtrlW => {
                self.buffer.kill_prev_word();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::CtrlT => {
                self.buffer.transpose();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::CtrlL => {
                self.clear_screen();
                self.render_state.reset();
                self.refresh_line();
                Ok(Flow::Continue)
            }
            Key::Up | Key::CtrlP => {
                self.history_browse(HistoryDirection::Prev);
                Ok(Flow::Continue)
            }
            Key::Down | Key::CtrlN => {
                self.history_browse(HistoryDirection::Next);
                Ok(Flow::Continue)
            }
            Key::Tab => {
                if self.completion_cb.is_some() {
                    if let Some(redispatch) = self.run_completion()? {
                        return self.handle_key(redispatch);
                    }
                }
                Ok(Flow::Continue)
            }
            Key::Char(c) => {
                self.insert_char(c);
                Ok(Flow::Continue)
            }
            Key::Esc | Key::Unknown => Ok(Flow::Continue),
        }
    }

    /// Insert-fast-path from spec §4.4: write one byte directly when the
    /// cursor is at the end of a single-line, in-frame buffer with no
    /// hints callback installed; otherwise do a full refresh.
    fn insert_char(&mut self, c: u8) {
        let was_at_end = self.buffer.pos() == self.buffer.len();
        if !self.buffer.insert(c) {
            log::trace!("insert rejected: buffer at capacity ({})", self.config.buf_max);
            return;
        }
        if was_at_end
            && !self.multiline
            && self.prompt.len() + self.buffer.len() < self.cols
            && self.hints_cb.is_none()
        {
            let _ = term::write_raw(self.out_fd, &[c]);
        } else {
            self.refresh_line();
        }
    }

    fn history_browse(&mut self, dir: HistoryDirection) {
        if self.history.is_empty() {
            return;
        }

        // Save current buf into the slot being left (spec §4.4
        // `history_next`), so an edit made mid-browse survives browsing
        // away and back instead of being silently discarded in favor of
        // the pristine stored entry.
        self.save_current_slot();

        match dir {
            HistoryDirection::Prev => {
                if self.history_index < self.history.len() {
                    self.history_index += 1;
                }
            }
            HistoryDirection::Next => {
                if self.history_index == 0 {
                    return;
                }
                self.history_index -= 1;
            }
        }

        if self.history_index == 0 {
            let saved = self.saved_buffer.clone();
            self.buffer.load(&saved);
        } else {
            let idx = self.history.len() - self.history_index;
            let entry = self.history_overlay[idx]
                .clone()
                .or_else(|| self.history.get(idx).map(str::to_string))
                .unwrap_or_default();
            self.buffer.load(&entry);
        }
        self.refresh_line();
    }

    /// Write the current buffer back into the slot `history_index`
    /// currently points at, before moving away from it.
    fn save_current_slot(&mut self) {
        let text = self.buffer.as_str().to_string();
        if self.history_index == 0 {
            self.saved_buffer = text;
        } else {
            let idx = self.history.len() - self.history_index;
            self.history_overlay[idx] = Some(text);
        }
    }

    /// Ring the terminal bell unless the host configured silence
    /// (spec §4.6 "nothing to do" signal; config's `bell_style`).
    fn ring_bell(&self) {
        if self.config.bell_style == BellStyle::Audible {
            term::bell(self.out_fd);
        }
    }

    /// The TAB completion sub-loop (spec §4.6). Reads raw bytes rather
    /// than decoded [`Key`]s: `keys::read_key` treats `0x1B` as the start
    /// of a multi-byte ESC sequence and blocks waiting for bytes a bare
    /// ESC-cancel never sends, so this loop checks `0x1B`/`0x09` against
    /// the raw byte directly (as linenoise does) and only decodes a full
    /// `Key` for the byte that ends up re-dispatched.
    ///
    /// Returns `Ok(Some(key))` when a non-TAB, non-ESC byte ended the
    /// sub-loop and must be re-dispatched by the caller; `Ok(None)` when
    /// the sub-loop resolved on its own (empty candidate list, or ESC
    /// cancel).
    fn run_completion(&mut self) -> Result<Option<Key>> {
        let mut completions = Completions::new();
        if let Some(cb) = self.completion_cb.as_mut() {
            cb(self.buffer.as_str(), &mut completions);
        }
        if completions.is_empty() {
            self.ring_bell();
            return Ok(None);
        }

        let original = self.buffer.as_str().to_string();
        let n = completions.len();
        let mut i = 0usize;

        loop {
            if i < n {
                self.buffer.load(completions.get(i).expect("i < n"));
            } else {
                self.buffer.load(&original);
            }
            self.refresh_line();

            let Some(b) = term::read_byte(self.in_fd)? else {
                return Err(Error::EndOfFile);
            };
            match b {
                0x09 => {
                    i = (i + 1) % (n + 1);
                    if i == n {
                        self.ring_bell();
                    }
                }
                0x1B => {
                    self.buffer.load(&original);
                    self.refresh_line();
                    return Ok(None);
                }
                other => {
                    if i < n {
                        self.buffer.load(completions.get(i).expect("i < n"));
                    } else {
                        self.buffer.load(&original);
                    }
                    let key = keys::decode_byte(self.in_fd, other)?;
                    return Ok(Some(key));
                }
            }
        }
    }

    fn refresh_line(&mut self) {
        self.refresh_line_impl(true);
    }

    fn refresh_line_without_hints(&mut self) {
        self.refresh_line_impl(false);
    }

    fn refresh_line_impl(&mut self, allow_hints: bool) {
        let hint = if allow_hints {
            self.hints_cb
                .as_mut()
                .and_then(|cb| cb(self.buffer.as_str()))
        } else {
            None
        };

        let mut out = crate::buffer::OutputBuffer::new();
        if self.multiline {
            render::refresh_multi_line(
                &mut out,
                self.prompt.as_bytes(),
                self.buffer.as_bytes(),
                self.buffer.pos(),
                self.cols,
                hint.as_ref(),
                &mut self.render_state,
            );
        } else {
            render::refresh_single_line(
                &mut out,
                self.prompt.as_bytes(),
                self.buffer.as_bytes(),
                self.buffer.pos(),
                self.cols,
                hint.as_ref(),
            );
        }
        out.flush_to(self.out_fd);

        if let Some(hint) = hint {
            if let Some(free_cb) = self.free_hints_cb.as_mut() {
                free_cb(hint.text);
            }
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.restore();
    }
}
