//! Integration tests driving `Editor::read_line` over a real pty, per
//! the boundary scenarios in spec.md §8.

mod support;

use lino::{Completions, Editor};
use support::Pty;

fn make_editor(pty: &Pty, prompt: &str) -> Editor {
    Editor::new(pty.slave, pty.slave, pty.slave, prompt)
}

#[test]
fn simple_line_returns_typed_text() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    pty.send(b"hi\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "hi");
}

#[test]
fn history_add_after_enter_is_host_driven() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    pty.send(b"hi\r");
    let line = editor.read_line("> ").unwrap();
    assert!(editor.history_add(line));
}

#[test]
fn ctrl_w_kills_previous_word() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    // "abc" (one word, no spaces) then Ctrl-W (0x17) then Enter.
    pty.send(b"abc\x17\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "");
}

#[test]
fn ctrl_w_stops_at_preceding_space() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    pty.send(b"a b c\x17\x17\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "a ");
}

#[test]
fn completion_accepts_candidate_on_enter() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    editor.set_completion_callback(Box::new(|line, c: &mut Completions| {
        if line == "h" {
            c.add("hello");
        }
    }));
    pty.send(b"h\t\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "hello");
}

#[test]
fn completion_esc_restores_original_buffer() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    editor.set_completion_callback(Box::new(|line, c: &mut Completions| {
        if line == "h" {
            c.add("hello");
        }
    }));
    pty.send(b"h\t\t\x1b\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "h");
}

#[test]
fn history_up_up_selects_second_newest() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    for s in ["one", "two", "three"] {
        editor.history_add(s);
    }
    // Up, Up, Enter, with no typed text.
    pty.send(b"\x1b[A\x1b[A\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "two");
}

#[test]
fn history_browse_preserves_edits_made_mid_session() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    for s in ["one", "two"] {
        editor.history_add(s);
    }
    // Up loads "two"; append '!'; Up again loads "one"; Down should
    // return to the edited "two!", not the pristine stored "two".
    pty.send(b"\x1b[A!\x1b[A\x1b[B\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "two!");
}

#[test]
fn ctrl_d_on_empty_buffer_is_eof() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    pty.send(b"\x04");
    let err = editor.read_line("> ").unwrap_err();
    assert!(matches!(err, lino::Error::EndOfFile));
}

#[test]
fn ctrl_d_on_nonempty_buffer_forward_deletes() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    // "ab", Left, Ctrl-D deletes the 'b', then Enter.
    pty.send(b"ab\x1b[D\x04\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "a");
}

#[test]
fn ctrl_c_returns_interrupted() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    pty.send(b"ab\x03");
    let err = editor.read_line("> ").unwrap_err();
    assert!(matches!(err, lino::Error::Interrupted));
}

#[test]
fn transpose_swaps_preceding_byte() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    // "ab", Left (cursor must be strictly before len for transpose to
    // fire), Ctrl-T swaps to "ba", then Enter.
    pty.send(b"ab\x1b[D\x14\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "ba");
}

#[test]
fn transpose_is_a_no_op_when_cursor_is_at_end() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    // Cursor sits at len after typing, so Ctrl-T's `pos < len`
    // precondition is unmet (spec §4.4) and the buffer is unchanged.
    pty.send(b"ab\x14\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "ab");
}

#[test]
fn multiline_mode_round_trips_a_line() {
    let pty = Pty::open();
    let mut editor = make_editor(&pty, "> ");
    editor.set_multiline(true);
    pty.send(b"hello\r");
    let line = editor.read_line("> ").unwrap();
    assert_eq!(line, "hello");
}
