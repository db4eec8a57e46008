mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dockerize", about = "Build application code into an image and run it as a container")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an image from APP, create a container, and start it
    Run(commands::RunArgs),
    /// Write the build context tarball without contacting the engine
    Archive {
        /// Source text, a file, or a directory; `-` reads stdin
        app: String,
        /// Output tar file
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,
        /// Recipe file used instead of the default
        #[arg(long, value_name = "FILE")]
        dockerfile: Option<PathBuf>,
        /// package.json used for non-directory input
        #[arg(long, value_name = "FILE")]
        package: Option<PathBuf>,
    },
    /// Print the default recipe
    Recipe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run(args).await?,
        Commands::Archive {
            app,
            output,
            dockerfile,
            package,
        } => commands::archive(&app, &output, dockerfile.as_deref(), package.as_deref()).await?,
        Commands::Recipe => commands::recipe().await?,
    }

    Ok(())
}
