//! `psserver`: the broker process.
//!
//! Usage: `psserver connections [portnum]`. Prints the bound port to stderr,
//! then serves forever. Sending SIGHUP prints the operation counters to
//! stderr.

use std::io::Write;
use std::process::ExitCode;

use psbroker::broker::Registry;
use psbroker::broker::stats::{hangup_trigger, run_stats_reporter};
use psbroker::cli::{self, Parsed, SERVER_USAGE, ServerArgs};
use psbroker::config::load_config;
use psbroker::transport::Server;
use psbroker::utils::error::BrokerError;
use psbroker::utils::logging;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse::<ServerArgs, _, _>(std::env::args_os()) {
        Parsed::Args(args) => args,
        Parsed::Informational(e) => e.exit(),
        Parsed::Usage(_) => return usage_error(),
    };

    let loaded = load_config(args.connections, args.port.unwrap_or(0)).map_err(BrokerError::from);
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("psserver: {e}");
            return usage_error();
        }
    };
    logging::init(&settings.logging.level);

    // install before the port is announced: SIGHUP would otherwise kill us
    let trigger = match hangup_trigger() {
        Ok(trigger) => Some(trigger),
        Err(e) => {
            error!("stats reporting disabled, unable to watch SIGHUP: {e}");
            None
        }
    };

    let registry = Registry::shared();
    let server = match Server::bind(&settings, registry.clone()).await {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            eprintln!("psserver: unable to open socket for listening");
            return ExitCode::from(2);
        }
    };

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "{}", server.local_port());
    let _ = stderr.flush();

    if let Some(trigger) = trigger {
        tokio::spawn(run_stats_reporter(registry, trigger, std::io::stderr()));
    }

    server.run().await;
    ExitCode::SUCCESS
}

fn usage_error() -> ExitCode {
    eprintln!("{SERVER_USAGE}");
    ExitCode::from(1)
}
