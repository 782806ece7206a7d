use crate::error::{PointError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum CommandType {
    Charge,
    Use,
    Balance,
    History,
}

#[derive(Debug, Deserialize)]
struct CommandRecord {
    r#type: CommandType,
    user: i64,
    amount: Option<i64>,
}

/// One operation requested by an input row.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    Charge { user_id: i64, amount: i64 },
    Use { user_id: i64, amount: i64 },
    Balance { user_id: i64 },
    History { user_id: i64 },
}

impl Command {
    pub fn user_id(&self) -> i64 {
        match *self {
            Command::Charge { user_id, .. }
            | Command::Use { user_id, .. }
            | Command::Balance { user_id }
            | Command::History { user_id } => user_id,
        }
    }
}

impl CommandRecord {
    fn into_command(self) -> Result<Command> {
        if self.user <= 0 {
            return Err(PointError::InvalidCommand(format!(
                "user id must be positive, got {}",
                self.user
            )));
        }

        let user_id = self.user;
        let amount = || {
            self.amount
                .ok_or_else(|| PointError::InvalidCommand("missing amount".to_string()))
        };

        Ok(match self.r#type {
            CommandType::Charge => Command::Charge {
                user_id,
                amount: amount()?,
            },
            CommandType::Use => Command::Use {
                user_id,
                amount: amount()?,
            },
            CommandType::Balance => Command::Balance { user_id },
            CommandType::History => Command::History { user_id },
        })
    }
}

/// Reads point commands from a CSV source with a `type, user, amount` header.
///
/// Whitespace is trimmed and the amount column may be omitted for read commands.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| {
                result
                    .map_err(PointError::from)
                    .and_then(CommandRecord::into_command)
            })
    }
}
