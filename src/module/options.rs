//! Various options usable by modules
//!
//! The structs in this module allow other modules to flatten them into
//! their own options struct. This allows for a unified yet non-cluttered
//! option set.

use structopt::StructOpt;

/// Options for connecting to the message broker
#[derive(Debug, StructOpt)]
pub struct AmqpOptions {
    /// AMQP broker URL
    #[structopt(
        short = "u",
        long = "url",
        env = "AMQP_URL",
        default_value = "amqp://localhost:5672",
        value_name = "url"
    )]
    pub url: String,
}
