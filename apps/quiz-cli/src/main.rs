#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quizdeck_cli::run().await
}
