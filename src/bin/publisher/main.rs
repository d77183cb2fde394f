use anyhow::{anyhow, Result};
use structopt::StructOpt;
use stringsvc::harness::{LoggingOptions, ModuleRunner};
use stringsvc::module::publisher::{Options, Publisher};
use tracing::info;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "stringsvc-publisher",
    about = "Sends uppercase and count requests to the string service and prints the responses."
)]
struct MainOptions {
    #[structopt(flatten)]
    logging: LoggingOptions,

    #[structopt(flatten)]
    publisher: Options,
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = MainOptions::from_args();
    options.logging.init();

    info!("stringsvc publisher {}", env!("CARGO_PKG_VERSION"));

    let reason = ModuleRunner::default()
        .run(Publisher::new(options.publisher))
        .await;

    if reason.is_failure() {
        return Err(anyhow!(reason));
    }

    Ok(())
}
