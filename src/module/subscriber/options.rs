use crate::module::options::AmqpOptions;
use structopt::StructOpt;

/// Options for the subscriber module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub amqp: AmqpOptions,
}
