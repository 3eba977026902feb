use std::io::{self, BufRead, IsTerminal, Read, Write};

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

pub fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// One prompted line on a terminal, the whole stream when stdin is piped.
pub fn read_entry(prompt: &str) -> Result<String> {
    if io::stdin().is_terminal() {
        read_line(prompt)
    } else {
        read_all(io::stdin().lock())
    }
}

fn read_all(mut reader: impl Read) -> Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text.trim().to_string())
}

/// Reads a line without echoing it.
pub fn read_hidden(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    enable_raw_mode()?;
    let result = read_hidden_raw();
    disable_raw_mode()?;
    println!();
    result
}

fn read_hidden_raw() -> Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            match code {
                KeyCode::Enter => return Ok(secret),
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    bail!("Cancelled")
                }
                KeyCode::Esc => bail!("Cancelled"),
                KeyCode::Char(c) => secret.push(c),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn piped_entries_are_read_whole() {
        let input = Cursor::new("Slept badly.\nBut the walk helped.\n\nFeeling calmer now.\n");
        assert_eq!(
            read_all(input).unwrap(),
            "Slept badly.\nBut the walk helped.\n\nFeeling calmer now."
        );
    }
}
