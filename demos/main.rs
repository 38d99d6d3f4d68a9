//! Interactive smoke test for the `lino` line editor: a REPL-shaped
//! loop around `Editor::read_line`, mirroring the teacher's own
//! construct-then-loop `main` shape.

use std::os::fd::AsRawFd;

use lino::{Completions, Editor, Error, Hint};

fn main() {
    let mut editor = Editor::new(
        std::io::stdin().as_raw_fd(),
        std::io::stdout().as_raw_fd(),
        std::io::stderr().as_raw_fd(),
        "lino> ",
    );

    editor.set_completion_callback(Box::new(|line, completions: &mut Completions| {
        for candidate in ["help", "history", "quit"] {
            if candidate.starts_with(line) {
                completions.add(candidate);
            }
        }
    }));

    editor.set_hints_callback(Box::new(|line| {
        if line == "help" {
            Some(Hint {
                text: " (show commands)".to_string(),
                color: 35,
                bold: false,
            })
        } else {
            None
        }
    }));

    loop {
        match editor.read_line("lino> ") {
            Ok(line) => {
                if line == "quit" {
                    break;
                }
                if !line.is_empty() {
                    editor.history_add(line.clone());
                    println!("{line}");
                }
            }
            Err(Error::Interrupted) => continue,
            Err(Error::EndOfFile) => break,
            Err(e) => {
                eprintln!("lino: {e}");
                break;
            }
        }
    }

    editor.restore();
}
