use clap::Parser;
use scripts::{cli::Cli, errors::ScriptError, utils::setup_client};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        rpc_url,
        deployments_path,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let client = setup_client(&priv_key, &rpc_url)?;

    command.run(client, &deployments_path).await
}
