use clap::Parser;

use pinharvest::cli::Cli;
use pinharvest::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pinharvest error: {e:#}");
            std::process::exit(2);
        }
    };

    let output_dir = config.output_dir().to_path_buf();

    // A harvest never fails all-or-nothing: report whatever was stored,
    // zero included, and exit cleanly either way.
    match pinharvest::harvest(config).await {
        Ok(summary) => {
            println!(
                "\nSuccessfully downloaded {} high-quality images to '{}'",
                summary.downloaded,
                output_dir.display()
            );
        }
        Err(e) => {
            eprintln!("An error occurred: {e}");
            println!(
                "\nSuccessfully downloaded 0 high-quality images to '{}'",
                output_dir.display()
            );
        }
    }
}
