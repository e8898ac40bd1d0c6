use ht_cli::{Arguments, CliError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1")
    }

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "htcli=info,ht_cli=info")
    }

    let args: Arguments = argh::from_env();

    if args.command.json() {
        tracing_subscriber::fmt::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        tracing_subscriber::fmt::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    match args.command.run().await {
        Ok(()) => {}
        Err(CliError::ChecksFailed { failed }) => {
            tracing::debug!(failed = failed, "probe finished with failures");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("command failed: {:?}", e);
            std::process::exit(1);
        }
    }
}
