#[tokio::main]
async fn main() -> anyhow::Result<()> {
    symptom_client::run().await
}
