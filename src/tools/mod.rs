pub mod command;
pub mod resolver;
pub mod runner;

pub use command::build_download_args;
pub use resolver::BinaryResolver;
pub use runner::ProcessRunner;
