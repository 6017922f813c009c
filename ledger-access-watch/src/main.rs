use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    ledger_access_watch::run().await?;
    Ok(())
}
