use crate::library::helpers::parse_seconds;
use crate::module::options::AmqpOptions;
use std::time::Duration;
use structopt::StructOpt;

/// Options for the publisher module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub amqp: AmqpOptions,

    /// Text sent with both requests
    #[structopt(short, long, env, default_value = "bird is the word")]
    pub word: String,

    /// Seconds to wait for each response before giving up
    #[structopt(long, env, default_value = "10", parse(try_from_str = parse_seconds), value_name = "secs")]
    pub timeout: Duration,
}
