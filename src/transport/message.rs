//! Wire messages
//!
//! Every message is one `\n`-terminated text line. Commands are split on the
//! first space into a keyword and the remainder:
//!
//! - `name <name>`
//! - `sub <topic>`
//! - `unsub <topic>`
//! - `pub <topic> <value...>`
//!
//! The broker answers with `:invalid` or delivers `<name>:<topic>:<value>`.

use std::fmt;

use crate::utils::error::CommandError;

/// Returns `true` if `s` may be used as a client name or topic on the broker:
/// non-empty and free of spaces and colons.
pub fn is_valid_token(s: &str) -> bool {
    !s.is_empty() && !s.contains([' ', ':'])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand<'a> {
    Name(&'a str),
    Subscribe(&'a str),
    Unsubscribe(&'a str),
    /// Topic and value, still joined by the first space.
    Publish(&'a str),
}

impl<'a> ClientCommand<'a> {
    /// Splits a line into its command keyword and argument.
    ///
    /// Only the shape of the line is checked here; argument validity is the
    /// registry's business.
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        let Some((keyword, rest)) = line.split_once(' ') else {
            return Err(CommandError::MalformedCommand(line.to_string()));
        };

        match keyword {
            "name" => Ok(ClientCommand::Name(rest)),
            "sub" => Ok(ClientCommand::Subscribe(rest)),
            "unsub" => Ok(ClientCommand::Unsubscribe(rest)),
            "pub" => Ok(ClientCommand::Publish(rest)),
            _ => Err(CommandError::MalformedCommand(line.to_string())),
        }
    }
}

/// Splits the argument of a `pub` command into topic and value.
pub fn split_publish(topic_and_value: &str) -> Result<(&str, &str), CommandError> {
    match topic_and_value.split_once(' ') {
        Some((topic, value)) if is_valid_token(topic) && !value.is_empty() => Ok((topic, value)),
        _ => Err(CommandError::MalformedPublish(topic_and_value.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage<'a> {
    Invalid,
    Delivery {
        publisher: &'a str,
        topic: &'a str,
        value: &'a str,
    },
}

impl fmt::Display for ServerMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Invalid => f.write_str(":invalid"),
            ServerMessage::Delivery {
                publisher,
                topic,
                value,
            } => write!(f, "{publisher}:{topic}:{value}"),
        }
    }
}
