// ttempsmooth-cli/src/lib.rs
//
// Library portion of the TTempSmooth CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{BenchArgs, Cli, Commands, ParamArgs, ValidateArgs, WeightsArgs};
pub use commands::bench::{execute_bench, BenchReport};
pub use commands::resolve_config;
pub use commands::validate::execute_validate;
pub use commands::weights::execute_weights;
pub use error::{CliErrorContext, CliResult};
