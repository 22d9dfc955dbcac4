use crate::error::{DeployerError, ValidationError};
use crate::payload::{Payload, PayloadField};
use std::{fmt, str::FromStr};
use strum_macros::{Display, EnumString};

/// Names accepted as the first token of a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CommandName {
    Add,
    Edit,
    Remove,
    List,
    Launch,
    Cancel,
    TestServo,
    Status,
}

impl CommandName {
    /// Accepted argument counts, inclusive.
    fn arity(self) -> (usize, usize) {
        match self {
            CommandName::Add => (Payload::ARG_COUNT, Payload::ARG_COUNT),
            CommandName::Edit => (3, 3),
            CommandName::Remove | CommandName::TestServo => (1, 1),
            CommandName::Launch => (0, 1),
            CommandName::List | CommandName::Cancel | CommandName::Status => (0, 0),
        }
    }
}

/// One typed operator request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(Payload),
    Edit { index: u16, field: String, value: String },
    Remove(u16),
    List,
    Launch(Option<u16>),
    Cancel,
    TestServo(u16),
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Unrecognized(String),
    Arity { command: CommandName, expected: (usize, usize), got: usize },
    Invalid(ValidationError),
    Deployer(DeployerError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unrecognized(name) => write!(f, "unrecognized command '{name}'"),
            CommandError::Arity { command, expected: (min, max), got } if min == max => {
                write!(f, "{command} takes {min} argument(s), got {got}")
            }
            CommandError::Arity { command, expected: (min, max), got } => {
                write!(f, "{command} takes {min} to {max} argument(s), got {got}")
            }
            CommandError::Invalid(e) => write!(f, "{e}"),
            CommandError::Deployer(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ValidationError> for CommandError {
    fn from(value: ValidationError) -> Self { CommandError::Invalid(value) }
}

impl From<DeployerError> for CommandError {
    fn from(value: DeployerError) -> Self { CommandError::Deployer(value) }
}

impl Command {
    /// Parses one whitespace-separated command line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = tokens.collect();
        Self::from_tokens(name, &args).map(Some)
    }

    pub fn from_tokens(name: &str, args: &[&str]) -> Result<Self, CommandError> {
        let command = CommandName::from_str(name)
            .map_err(|_| CommandError::Unrecognized(name.to_string()))?;
        let (min, max) = command.arity();
        if args.len() < min || args.len() > max {
            return Err(CommandError::Arity { command, expected: (min, max), got: args.len() });
        }

        Ok(match command {
            CommandName::Add => Command::Add(Payload::from_args(args)?),
            CommandName::Edit => Command::Edit {
                index: PayloadField::parse_index(args[0])?,
                field: args[1].to_string(),
                value: args[2].to_string(),
            },
            CommandName::Remove => Command::Remove(PayloadField::parse_index(args[0])?),
            CommandName::List => Command::List,
            CommandName::Launch => {
                Command::Launch(args.first().copied().map(PayloadField::parse_index).transpose()?)
            }
            CommandName::Cancel => Command::Cancel,
            CommandName::TestServo => Command::TestServo(PayloadField::parse_index(args[0])?),
            CommandName::Status => Command::Status,
        })
    }
}
