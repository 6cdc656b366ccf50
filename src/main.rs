use anyhow::Result;
use stepwise::cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::from_args().await?;
    let args = stepwise::cli::Args::parse_args();

    app.run(args).await?;

    Ok(())
}
