//! Command-line interface for trade-loadgen
//!
//! # Usage Examples
//!
//! ```bash
//! # Publish 1000 trade events per second to "stocks", creating the topic first
//! trade-loadgen run \
//!   --kafka-brokers localhost:9092 \
//!   --topic stocks \
//!   --partitions 4 \
//!   --message-rate 1000 \
//!   --create-topic
//!
//! # Deterministic data with a report every 5 seconds
//! trade-loadgen run --seed 42 --report-interval 5s
//!
//! # Create the topic only
//! trade-loadgen create-topic --topic stocks --partitions 4
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=trade_producer=debug`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trade_loadgen::config::duration::parse_interval;
use trade_producer::{
    spawn_reporter, BatchProducer, KafkaAdmin, KafkaPublisher, ProducerArgs, ProducerConfig,
    TopicAdmin, REPLICATION_FACTOR,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "trade-loadgen")]
#[command(about = "Publish synthetic trade events to Kafka at a fixed rate")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce trade events until interrupted (Ctrl+C)
    Run {
        #[command(flatten)]
        producer: ProducerArgs,

        /// Create the topic before producing
        #[arg(long)]
        create_topic: bool,

        /// Interval between report lines (e.g., "1s", "500ms", "1m")
        #[arg(long, default_value = "1s", value_parser = parse_interval)]
        report_interval: Duration,
    },

    /// Create the topic and exit
    CreateTopic {
        #[command(flatten)]
        producer: ProducerArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            producer,
            create_topic,
            report_interval,
        } => run_producer(&producer, create_topic, report_interval).await,
        Commands::CreateTopic { producer } => {
            let config =
                ProducerConfig::try_from(&producer).context("Invalid producer configuration")?;
            KafkaAdmin::new(config.broker_address())
                .create_topic(
                    config.topic_name(),
                    config.partition_count(),
                    REPLICATION_FACTOR,
                )
                .await
                .with_context(|| format!("Failed to create topic '{}'", config.topic_name()))
        }
    }
}

async fn run_producer(
    args: &ProducerArgs,
    create_topic: bool,
    report_interval: Duration,
) -> anyhow::Result<()> {
    let config = ProducerConfig::try_from(args).context("Invalid producer configuration")?;

    let rng = match args.seed {
        Some(seed) => {
            info!("Using random seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let publisher = KafkaPublisher::new(&config).context("Failed to create Kafka producer")?;
    let mut producer = BatchProducer::new(config, publisher, rng);

    if create_topic {
        let admin = KafkaAdmin::new(producer.config().broker_address());
        let topic = producer.config().topic_name().to_string();
        producer
            .create_topic(&admin)
            .await
            .with_context(|| format!("Failed to create topic '{topic}'"))?;
    }

    let shutdown = setup_shutdown_handler();
    let reporter_token = shutdown.child_token();
    let reporter = spawn_reporter(producer.stats(), report_interval, reporter_token.clone());

    let result = producer.run(shutdown).await;

    reporter_token.cancel();
    reporter.await.context("Reporter task failed")?;

    result.context("Producer failed")
}

/// Returns a token that is cancelled on Ctrl+C.
fn setup_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();

    let handler_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt signal (Ctrl+C)");
                handler_token.cancel();
            }
            Err(e) => warn!("Failed to install Ctrl+C signal handler: {}", e),
        }
    });

    token
}
