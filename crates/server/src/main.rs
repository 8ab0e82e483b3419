#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cms_server::run().await
}
