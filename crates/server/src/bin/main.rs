use sqlgate_server::GatewayServer;

#[derive(clap::Parser)]
struct Args {
    #[arg(long, default_value = "config/sqlgate.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = <Args as clap::Parser>::parse();

    GatewayServer::new().with_config(&args.config).run().await
}
