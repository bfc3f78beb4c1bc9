use anyhow::{anyhow, bail, Result};
use client_core::{MailId, SortColumn, UserIntent};

pub const HELP: &str = "commands: select <id> | sort <date|from|to|subject> | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intent(UserIntent),
    Help,
    Quit,
}

/// Parses one line typed on stdin. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        bail!("too many arguments; {HELP}");
    }

    let command = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("select" | "s", Some(raw)) => {
            let id = raw
                .parse::<i64>()
                .map_err(|_| anyhow!("not a mail id: {raw:?}"))?;
            Command::Intent(UserIntent::SelectRow(MailId(id)))
        }
        ("sort" | "o", Some(raw)) => {
            let column = SortColumn::parse(raw).ok_or_else(|| anyhow!("unknown column: {raw:?}"))?;
            Command::Intent(UserIntent::ToggleSort(column))
        }
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        _ => bail!("unrecognized command {line:?}; {HELP}"),
    };
    Ok(Some(command))
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
