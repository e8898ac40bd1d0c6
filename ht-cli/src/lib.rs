use argh::FromArgs;
use thiserror::Error;

pub mod api;
pub mod console;
pub mod db;
pub mod probe;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to create HTTP client: {0}")]
    ClientBuildError(#[source] reqwest::Error),
    #[error("{failed} check(s) failed")]
    ChecksFailed { failed: usize },
}

/// Probes the health tracker database and backend API.
#[derive(FromArgs, PartialEq, Eq, Debug)]
pub struct Arguments {
    #[argh(subcommand)]
    pub command: RootCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum RootCommand {
    Db(db::DbCommand),
    Api(api::ApiCommand),
}

impl RootCommand {
    pub fn json(&self) -> bool {
        match self {
            RootCommand::Db(cmd) => cmd.json,
            RootCommand::Api(cmd) => cmd.json,
        }
    }

    pub async fn run(&self) -> Result<(), CliError> {
        match self {
            RootCommand::Db(cmd) => cmd.run().await,
            RootCommand::Api(cmd) => cmd.run().await,
        }
    }
}
