use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use apsp::generate::{GraphSpec, random_graph};
use apsp::{CollectOrder, CoordinatorConfig, PoolConfig, RunConfig, TransportKind};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Distributed all-pairs shortest paths", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the distance matrix of a graph file
    Run {
        /// Workers besides the coordinator; 0 computes everything on the coordinator
        #[arg(short, long)]
        workers: usize,

        /// Result file; defaults to the input path with its last two characters replaced by "out"
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = CollectArg::Ascending)]
        collect_order: CollectArg,

        #[arg(long, value_enum, default_value_t = TransportArg::Channel)]
        transport: TransportArg,

        /// Give up on a worker that does not accept or answer a message within this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Graph file
        graph: PathBuf,
    },
    /// Write a random graph file
    Generate {
        #[arg(short = 'n', long)]
        vertices: usize,

        /// Probability of an edge between any two distinct vertices
        #[arg(long, default_value_t = 0.3)]
        density: f64,

        #[arg(long, default_value_t = 100)]
        max_weight: u32,

        #[arg(long)]
        seed: Option<u64>,

        path: PathBuf,
    },
    /// Print a graph or result file as text
    Show { path: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CollectArg {
    Ascending,
    Completion,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransportArg {
    Channel,
    Wire,
}

impl From<CollectArg> for CollectOrder {
    fn from(arg: CollectArg) -> Self {
        match arg {
            CollectArg::Ascending => CollectOrder::Ascending,
            CollectArg::Completion => CollectOrder::Completion,
        }
    }
}

impl From<TransportArg> for TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Channel => TransportKind::Channel,
            TransportArg::Wire => TransportKind::Wire,
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn execute(command: Command) -> apsp::Result<()> {
    match command {
        Command::Run {
            workers,
            output,
            collect_order,
            transport,
            timeout_ms,
            graph,
        } => {
            let config = RunConfig {
                input: graph,
                output,
                pool: PoolConfig {
                    workers,
                    transport: transport.into(),
                    coordinator: CoordinatorConfig {
                        collect_order: collect_order.into(),
                        link_timeout: timeout_ms.map(Duration::from_millis),
                    },
                },
            };
            info!(workers, "starting run");
            let written = apsp::run_file(&config).await?;
            println!("{}", written.display());
        }
        Command::Generate {
            vertices,
            density,
            max_weight,
            seed,
            path,
        } => {
            let spec = GraphSpec {
                vertices,
                density,
                max_weight,
            };
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let graph = random_graph(&spec, &mut rng)?;
            apsp::format::write_graph(&path, &graph).await?;
            info!(path = %path.display(), vertices, "graph written");
        }
        Command::Show { path } => {
            let graph = apsp::format::read_graph(&path).await?;
            print!("{}", apsp::format::render(&graph));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
