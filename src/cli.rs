use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "audiopress")]
#[command(author, version, about = "Audio transcoding HTTP service")]
pub struct Cli {
    /// Enable verbose logging of engine output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on (overrides the PORT environment variable)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Display version information
    Version,
}
