//! Command dispatch: bridges CLI args -> engine operations -> output formatting.

pub mod children;
pub mod config_cmd;
pub mod consent;
pub mod parents;
pub mod privacy;
pub mod requests;
pub mod scholarships;
pub mod subscription;
pub mod util;

use scholarly_core::Engine;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Subscription(args) => subscription::handle(engine, args, global).await,
        Command::Requests(args) => requests::handle(engine, args, global),
        Command::Parents(args) => parents::handle(engine, args, global),
        Command::Children(args) => children::handle(engine, args, global),
        Command::Privacy(args) => privacy::handle(engine, args, global),
        Command::Consent(args) => consent::handle(engine, args, global),
        Command::Scholarships(args) => scholarships::handle(engine, args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions do not open the store".into(),
        )),
    }
}
