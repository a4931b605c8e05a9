use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use upload_client::{ImageUpload, DEFAULT_ENDPOINT};

#[derive(Parser)]
#[command(name = "upload-client")]
#[command(version, about = "Upload an image through the relay")]
struct Cli {
    /// Image to upload
    #[arg(required = true)]
    file: PathBuf,

    /// Upload endpoint of the relay
    #[arg(long, env = "UPLOAD_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut widget = ImageUpload::new(cli.endpoint)?;
    widget.select_file(cli.file);

    let Some(image_url) = widget.upload().await else {
        anyhow::bail!("Upload did not produce an image URL");
    };

    println!("{image_url}");
    Ok(())
}
