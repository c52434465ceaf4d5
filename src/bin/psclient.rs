//! `psclient`: reference client.
//!
//! Usage: `psclient portnum name [topic] ...`. Announces the name and
//! subscriptions, relays stdin lines to the broker and prints broker lines
//! to stdout.

use std::process::ExitCode;

use psbroker::cli::{self, CLIENT_USAGE, ClientArgs, Parsed};
use psbroker::relay::{self, SessionEnd};
use psbroker::utils::error::RelayError;
use psbroker::utils::logging;
use tokio::io::{BufReader, stdin, stdout};
use tokio::runtime::Runtime;

fn main() -> ExitCode {
    let args = match cli::parse::<ClientArgs, _, _>(std::env::args_os()) {
        Parsed::Args(args) => args,
        Parsed::Informational(e) => e.exit(),
        Parsed::Usage(_) => {
            eprintln!("{CLIENT_USAGE}");
            return ExitCode::from(1);
        }
    };
    logging::init("warn");

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("psclient: {e}");
            return ExitCode::FAILURE;
        }
    };
    let code = runtime.block_on(run(&args));
    // a pending stdin read cannot be cancelled; don't wait for it
    runtime.shutdown_background();
    code
}

async fn run(args: &ClientArgs) -> ExitCode {
    match session(args).await {
        Ok(SessionEnd::InputClosed) => ExitCode::SUCCESS,
        Ok(end @ SessionEnd::BrokerClosed) => {
            eprintln!("psclient: server connection terminated");
            ExitCode::from(end.exit_code())
        }
        Err(e @ RelayError::Io(_)) => {
            eprintln!("psclient: server connection terminated");
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            eprintln!("psclient: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn session(args: &ClientArgs) -> Result<SessionEnd, RelayError> {
    relay::validate(&args.name, &args.topics)?;
    let stream = relay::connect(&args.port).await?;
    let (from_broker, to_broker) = stream.into_split();

    relay::run_session(
        &args.name,
        &args.topics,
        BufReader::new(stdin()),
        stdout(),
        from_broker,
        to_broker,
    )
    .await
}
