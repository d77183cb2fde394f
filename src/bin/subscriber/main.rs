use anyhow::{anyhow, Result};
use structopt::StructOpt;
use stringsvc::harness::{LoggingOptions, ModuleRunner};
use stringsvc::module::subscriber::{Options, Subscriber};
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "stringsvc-subscriber",
    about = "Answers uppercase and count requests of the string service."
)]
struct MainOptions {
    #[structopt(flatten)]
    logging: LoggingOptions,

    /// Port on which a readiness probe is served
    #[structopt(long, env, value_name = "port")]
    status_server: Option<u16>,

    #[structopt(flatten)]
    subscriber: Options,
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = MainOptions::from_args();
    options.logging.init();

    info!("stringsvc subscriber {}", env!("CARGO_PKG_VERSION"));

    let runner = match options.status_server {
        Some(port) => ModuleRunner::new_with_status_server(port),
        None => ModuleRunner::default(),
    };

    let reason = runner.run(Subscriber::new(options.subscriber)).await;

    if reason.is_failure() {
        return Err(anyhow!(reason));
    }

    Ok(())
}
