//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], or [`check`].
//! Each handler lives in its own submodule.

pub mod check;
pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::ProxyError;

pub async fn dispatch(cli: Cli) -> Result<(), ProxyError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args).await,
        Some(Commands::Check(ref args)) => check::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  splitproxy v{version} - local UI, production API\n\n  \
         No command provided. To get started:\n\n    \
         splitproxy init                   Generate a starter config\n    \
         splitproxy run                    Start the proxy on 127.0.0.1:8081\n    \
         splitproxy check /catalogue/x     See where a path would be routed\n    \
         splitproxy --help                 See all commands and options\n"
    );
}
