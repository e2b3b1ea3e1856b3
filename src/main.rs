use clap::Parser;
use emberchain::{validate_address, Command, Node, NodeEvent, Opt, Settings, Wallet};
use log::{error, info, warn, LevelFilter};
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command).await {
        error!("Error: {e}");
        process::exit(1);
    }
}

async fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Keygen => {
            let wallet = Wallet::new();
            println!("Private key: {}", wallet.get_private_key());
            println!("Public key:  {}", wallet.get_public_key());
            println!("Address:     {}", wallet.get_address());
        }
        Command::Run {
            config,
            listen,
            peers,
            miner,
            difficulty,
        } => {
            let mut settings = match config {
                Some(path) => Settings::from_file(&path)?,
                None => Settings::default(),
            };
            if listen.is_some() {
                settings.listen = listen;
            }
            if !peers.is_empty() {
                settings.bootstrap = peers;
            }
            if miner.is_some() {
                settings.miner = miner;
            }
            if let Some(d) = difficulty {
                settings.difficulty = d;
            }
            if let Some(addr) = settings.miner.as_deref() {
                if !validate_address(addr) {
                    return Err(format!("Invalid miner address: {addr}").into());
                }
            }

            let node = Node::start(&settings)?;
            info!(
                "Node started at height {} (difficulty {})",
                node.height().await,
                settings.difficulty
            );

            // Surface emitted events the way external collaborators would
            let mut events = node.subscribe();
            tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    match event {
                        NodeEvent::Block(block) => info!(
                            "event: block {} at height {}",
                            block.get_hash(),
                            block.get_index()
                        ),
                        NodeEvent::Tx(tx) => info!("event: tx {}", tx.get_id()),
                    }
                }
            });

            if let Some(reward_address) = settings.miner.clone() {
                let miner_node = Arc::clone(&node);
                tokio::spawn(async move {
                    loop {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        if miner_node.list_mempool().await.is_empty() {
                            continue;
                        }
                        match miner_node.mine_block(Some(reward_address.clone())).await {
                            Ok(block) => {
                                info!(
                                    "Mined block {} at height {}",
                                    block.get_hash(),
                                    block.get_index()
                                )
                            }
                            Err(e) => warn!("Mining failed: {e}"),
                        }
                    }
                });
            }

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            node.shutdown();
        }
    }
    Ok(())
}
