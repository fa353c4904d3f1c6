#[tokio::main]
async fn main() -> anyhow::Result<()> {
    slotql_server::start().await
}
