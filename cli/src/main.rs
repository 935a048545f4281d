// gossamer — operator CLI for the gossip failure-detection core
//
// Prints the size-dependent limits a config produces, frames and unframes
// message batches, and replays a suspicion against the adaptive timer.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use gossamer_core::gossip::{k_random_nodes, move_dead_nodes, shuffle_nodes, Node, NodeStatus};
use gossamer_core::message::{Alive, MessageType};
use gossamer_core::transport::{send_messages, MemoryNetwork, Transport};
use gossamer_core::wire::{decode, decode_packet, encode, encode_packet};
use gossamer_core::{GossipConfig, Suspicion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "gossamer")]
#[command(about = "Gossamer — gossip failure detection toolkit", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file (defaults to the LAN profile)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show limits derived for the given cluster sizes
    Scale {
        #[arg(default_values_t = vec![1usize, 10, 32, 33, 65, 100, 1000])]
        nodes: Vec<usize>,
    },
    /// Frame user messages into packets, then decode them again
    Frame {
        messages: Vec<String>,
        /// Override the config's compression setting
        #[arg(long)]
        compress: Option<bool>,
    },
    /// Replay a suspicion with confirmations arriving at fixed intervals
    Suspect {
        /// Cluster size used to derive timeouts and the confirmation target
        #[arg(short, long, default_value = "10")]
        nodes: usize,
        /// Confirmations to deliver
        #[arg(long, default_value = "0")]
        confirmations: u32,
        /// Gap between confirmations in milliseconds
        #[arg(long, default_value = "100")]
        every_ms: u64,
    },
    /// Run one gossip round across an in-memory cluster
    Round {
        #[arg(short, long, default_value = "8")]
        nodes: usize,
        /// Nodes already dead past the grace window
        #[arg(long, default_value = "2")]
        dead: usize,
        #[arg(long, default_value = "1")]
        seed: u64,
    },
    /// Inspect or write configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a profile to a file
    Init {
        path: PathBuf,
        #[arg(long, value_enum, default_value = "lan")]
        profile: config::Profile,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if let Commands::Config { action: ConfigAction::Init { path, profile } } = &cli.command {
        return cmd_config_init(path, *profile);
    }

    let config = config::load(cli.config.as_deref())?;
    tracing::debug!("Loaded config: {:?}", config);

    match cli.command {
        Commands::Scale { nodes } => cmd_scale(&config, &nodes),
        Commands::Frame { messages, compress } => {
            cmd_frame(&config, messages, compress.unwrap_or(config.enable_compression)).await
        }
        Commands::Suspect { nodes, confirmations, every_ms } => {
            cmd_suspect(&config, nodes, confirmations, every_ms).await
        }
        Commands::Round { nodes, dead, seed } => cmd_round(&config, nodes, dead, seed).await,
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config),
        Commands::Config { action: ConfigAction::Init { .. } } => Ok(()),
    }
}

fn cmd_scale(config: &GossipConfig, sizes: &[usize]) -> Result<()> {
    println!("{}", "Cluster scaling".bold());
    println!(
        "  {:>7}  {:>11}  {:>10}  {:>10}  {:>3}  {:>10}",
        "nodes", "retransmit", "susp min", "susp max", "k", "push/pull"
    );

    for &n in sizes {
        let (min, max) = config.suspicion_bounds(n);
        println!(
            "  {:>7}  {:>11}  {:>10}  {:>10}  {:>3}  {:>10}",
            n.to_string().bright_cyan(),
            config.retransmit_limit(n),
            format!("{:?}", min),
            format!("{:?}", max),
            config.confirmation_target(n),
            format!("{:?}", config.push_pull_interval(n)),
        );
    }
    Ok(())
}

async fn cmd_frame(config: &GossipConfig, messages: Vec<String>, compress: bool) -> Result<()> {
    let encoded = messages
        .iter()
        .map(|m| encode(MessageType::User, m))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to encode messages")?;

    let packets = encode_packet(&encoded, compress).context("Failed to frame messages")?;

    println!(
        "{} {} messages -> {} packets (compression {})",
        "Framed".bold(),
        messages.len(),
        packets.len(),
        if compress { "on".green() } else { "off".yellow() }
    );

    for (i, packet) in packets.iter().enumerate() {
        let over = packet.len() > config.udp_buffer_size;
        let size = format!("{} bytes", packet.len());
        println!(
            "  {} packet {}: {}",
            "•".bright_green(),
            i,
            if over { size.bright_red() } else { size.normal() }
        );
        println!("    {}", hex::encode(packet).dimmed());

        for msg in decode_packet(packet).context("Failed to decode packet")? {
            let text: String = decode(&msg.body).context("Failed to decode message body")?;
            println!("    {:?}: {}", msg.msg_type, text.bright_cyan());
        }
    }

    // Push the same batch through an in-memory transport as a sanity check
    let net = MemoryNetwork::new();
    let local = net.bind(SocketAddr::from(([127, 0, 0, 1], config.bind_port)))?;
    let remote_addr = SocketAddr::from(([127, 0, 0, 1], config.bind_port.wrapping_add(1)));
    let remote = net.bind(remote_addr)?;
    let mut rx = remote
        .take_packet_rx()
        .context("Packet receiver already taken")?;

    let sent = send_messages(&local, &remote_addr.to_string(), &encoded, compress).await?;
    let mut received = 0;
    for _ in 0..sent {
        if let Some(packet) = rx.recv().await {
            received += decode_packet(&packet.buf)?.len();
        }
    }
    println!(
        "  {} {} of {} messages delivered over the memory transport",
        "✓".green(),
        received,
        messages.len()
    );

    Ok(())
}

async fn cmd_suspect(config: &GossipConfig, nodes: usize, confirmations: u32, every_ms: u64) -> Result<()> {
    let (min, max) = config.suspicion_bounds(nodes);
    let k = config.confirmation_target(nodes);

    println!("{}", "Suspicion replay".bold());
    println!("  cluster size: {}", nodes);
    println!("  bounds:       {:?} .. {:?}", min, max);
    println!("  target k:     {}", k);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let start = tokio::time::Instant::now();
    let suspicion = Suspicion::new("local", k, min, max, move |n| {
        let _ = tx.send(n);
    });

    let confirmer = suspicion.clone();
    let feeder = tokio::spawn(async move {
        for i in 0..confirmations {
            tokio::time::sleep(Duration::from_millis(every_ms)).await;
            let peer = format!("peer-{}", i);
            let accepted = confirmer.confirm(&peer);
            println!(
                "  {:>8?}  confirm from {} -> {}",
                start.elapsed(),
                peer,
                if accepted { "accepted".green() } else { "ignored".yellow() }
            );
        }
    });

    let n = rx.recv().await.context("Suspicion dropped without firing")?;
    feeder.abort();

    println!(
        "  {} declared dead after {:?} with {} confirmations",
        "✗".bright_red(),
        start.elapsed(),
        n
    );
    Ok(())
}

async fn cmd_round(config: &GossipConfig, nodes: usize, dead: usize, seed: u64) -> Result<()> {
    anyhow::ensure!(nodes > 0, "a round needs at least one member");
    let mut rng = StdRng::seed_from_u64(seed);
    let base = config.bind_port;

    let mut members: Vec<Node> = (0..nodes)
        .map(|i| {
            let port = base.wrapping_add(i as u16);
            Node::new(format!("node-{}", i), SocketAddr::from(([127, 0, 0, 1], port)))
        })
        .collect();

    let stale = std::time::Instant::now()
        .checked_sub(config.gossip_to_the_dead_time() + Duration::from_secs(1))
        .context("Clock too close to its epoch")?;
    for node in members.iter_mut().skip(1).take(dead) {
        node.status = NodeStatus::Dead;
        node.state_change = stale;
    }

    let net = MemoryNetwork::new();
    let mut transports = Vec::with_capacity(nodes);
    for node in &members {
        transports.push(net.bind(node.addr)?);
    }

    let mut gossipable = members[1..].to_vec();
    shuffle_nodes(&mut rng, &mut gossipable);
    let live_end = move_dead_nodes(&mut gossipable, config.gossip_to_the_dead_time());
    let targets = k_random_nodes(&mut rng, config.gossip_nodes, &gossipable[..live_end], |n| {
        n.status == NodeStatus::Left
    });

    let local = &transports[0];
    let advertise = local.final_advertise_addr(
        config.advertise_ip()?,
        config.advertise_port.unwrap_or(0),
    )?;

    println!("{}", "Gossip round".bold());
    println!(
        "  {} members, {} evictable, {} gossip targets every {:?}",
        nodes,
        gossipable.len() - live_end,
        targets.len(),
        config.gossip_interval()
    );
    println!("  advertising {}", advertise.to_string().bright_cyan());

    let alive = Alive {
        incarnation: members[0].incarnation,
        node: members[0].name.clone(),
        addr: advertise.ip().to_string(),
        port: advertise.port(),
    };
    let msg = encode(MessageType::Alive, &alive)?;
    for target in &targets {
        let sent = send_messages(local, &target.addr.to_string(), &[msg.clone()], false).await?;
        println!("  {} {} ({} packet)", "→".bright_green(), target.name.bright_cyan(), sent);
    }

    // Full state sync with one of the targets over a stream
    if let Some(peer) = targets.first() {
        let mut stream = local
            .dial_timeout(&peer.addr.to_string(), config.tcp_timeout())
            .await
            .with_context(|| format!("Failed to dial {}", peer.addr))?;
        let state: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        let sync = encode(MessageType::PushPull, &state)?;
        stream.write_all(&sync).await.context("Failed to write push/pull state")?;
        println!(
            "  {} push/pull with {} ({} bytes)",
            "⇄".bright_green(),
            peer.name.bright_cyan(),
            sync.len()
        );
    }

    Ok(())
}

fn cmd_config_show(config: &GossipConfig) -> Result<()> {
    println!("{}", "Configuration".bold());
    for (key, value) in config::list(config) {
        println!("  {:<28} {}", key, value.bright_cyan());
    }
    Ok(())
}

fn cmd_config_init(path: &std::path::Path, profile: config::Profile) -> Result<()> {
    config::save(&profile.config(), path)?;
    println!("{} Wrote {:?} profile to {}", "✓".green(), profile, path.display());
    Ok(())
}
