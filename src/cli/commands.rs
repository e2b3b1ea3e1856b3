use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "emberchain")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "keygen", about = "Generate a keypair and print its address")]
    Keygen,
    #[command(name = "run", about = "Run a node")]
    Run {
        #[arg(long, help = "Path to a TOML settings file")]
        config: Option<PathBuf>,
        #[arg(
            long,
            help = "Multiaddr to listen on, e.g. /ip4/0.0.0.0/udp/9000/quic-v1"
        )]
        listen: Option<String>,
        #[arg(long = "peer", help = "Bootstrap peer multiaddr (repeatable)")]
        peers: Vec<String>,
        #[arg(long, help = "Enable mining and send rewards to ADDRESS")]
        miner: Option<String>,
        #[arg(long, help = "Required leading hex zeros in block hashes")]
        difficulty: Option<u32>,
    },
}
