#[tokio::main]
async fn main() -> anyhow::Result<()> {
    medicare_assist::run().await
}
