//! Command-line arguments for the two binaries.
//!
//! Both binaries report any parse failure with their fixed usage line and
//! exit status 1. `psserver --help` and `--version` keep clap's behaviour;
//! the client takes every leading word, dashes included, as its port.

use clap::Parser;
use clap::error::ErrorKind;

pub const SERVER_USAGE: &str = "Usage: psserver connections [portnum]";
pub const CLIENT_USAGE: &str = "Usage: psclient portnum name [topic] ...";

pub const MIN_PORT: u16 = 1024;

/// Line-based publish/subscribe broker
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "psserver", version)]
pub struct ServerArgs {
    /// Maximum number of connections serviced at once (0 = unbounded)
    pub connections: u32,

    /// Port to listen on (1024-65535, or 0 for an ephemeral port)
    #[arg(value_parser = parse_port)]
    pub port: Option<u16>,
}

/// Reference client for the broker
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "psclient", version)]
pub struct ClientArgs {
    /// Broker port on localhost, resolved as given
    #[arg(allow_hyphen_values = true)]
    pub port: String,

    /// Name to announce to the broker
    #[arg(allow_hyphen_values = true)]
    pub name: String,

    /// Topics to subscribe to at startup
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    pub topics: Vec<String>,
}

/// Accepts 0 (ephemeral) or a port in 1024..=65535.
pub fn parse_port(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a valid port number"))?;
    if port != 0 && port < MIN_PORT {
        return Err(format!("port {port} is below {MIN_PORT}"));
    }
    Ok(port)
}

/// Outcome of parsing a binary's arguments.
#[derive(Debug)]
pub enum Parsed<T> {
    Args(T),
    /// Help or version was requested; clap prints it.
    Informational(clap::Error),
    Usage(clap::Error),
}

pub fn parse<T, I, S>(args: I) -> Parsed<T>
where
    T: Parser,
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(args) => Parsed::Args(args),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Parsed::Informational(e)
        }
        Err(e) => Parsed::Usage(e),
    }
}
