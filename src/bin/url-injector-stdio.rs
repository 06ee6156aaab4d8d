use url_injector::stdio_service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stdio_service::run().await
}
