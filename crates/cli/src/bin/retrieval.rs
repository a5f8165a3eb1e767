use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    retrieval_cli::main_entry().await
}
