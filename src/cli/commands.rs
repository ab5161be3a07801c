use clap::Subcommand;

use super::ask::AskArgs;
use super::load_data::LoadDataArgs;
use super::policy::PolicyArgs;
use super::serve::ServeArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Serve the query API over HTTP
    Serve(ServeArgs),

    /// Answer a single question from the command line
    Ask(AskArgs),

    /// Load the supply-chain CSV export into the tabular store
    LoadData(LoadDataArgs),

    /// Inspect and test access policy
    Policy(PolicyArgs),
}
