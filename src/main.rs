//! hostblock: NFQUEUE-based HTTP Host header domain blocker
//!
//! This is the main entry point for the blocker.
//!
//! # Usage
//!
//! ```bash
//! # Direct port-80 traffic to queue 0
//! iptables -A OUTPUT -p tcp --dport 80 -j NFQUEUE --queue-num 0
//!
//! # Run against a top-sites blocklist
//! sudo ./hostblock top-1m.txt
//!
//! # Use a different queue number
//! sudo ./hostblock -q 3 top-1m.txt
//!
//! # Run with a different log level
//! HOSTBLOCK_LOG_LEVEL=debug sudo ./hostblock top-1m.txt
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use hostblock::blocklist::BlockList;
use hostblock::error::AppError;
use hostblock::filter::HostFilter;
use hostblock::queue::{QueueConfig, QueueLoop};

/// Exit code for command-line usage errors
const EXIT_USAGE: u8 = 2;

/// Command-line arguments
struct Args {
    /// Blocklist file path
    blocklist_path: PathBuf,
    /// NFQUEUE number to bind
    queue_num: u16,
}

impl Args {
    fn parse() -> Self {
        let mut blocklist_path = None;
        let mut queue_num = 0u16;
        let mut args = std::env::args().skip(1);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-q" | "--queue" => {
                    queue_num = match args.next().and_then(|v| v.parse().ok()) {
                        Some(num) => num,
                        None => usage_error("--queue requires a number between 0 and 65535"),
                    };
                }
                "-h" | "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "-V" | "--version" => {
                    println!("hostblock v{}", hostblock::VERSION);
                    std::process::exit(0);
                }
                _ if arg.starts_with('-') => {
                    usage_error(&format!("Unknown option: {arg}"));
                }
                _ => {
                    if blocklist_path.is_some() {
                        usage_error("Expected exactly one blocklist path");
                    }
                    blocklist_path = Some(PathBuf::from(arg));
                }
            }
        }

        let Some(blocklist_path) = blocklist_path else {
            usage_error("Missing required <BLOCKLIST> argument");
        };

        Self {
            blocklist_path,
            queue_num,
        }
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {message}");
    eprintln!();
    eprintln!("Usage: hostblock [OPTIONS] <BLOCKLIST>");
    eprintln!("Try 'hostblock --help' for more information.");
    std::process::exit(i32::from(EXIT_USAGE));
}

fn print_help() {
    println!(
        r#"hostblock v{}

Drops HTTP packets whose Host header is on a blocklist, via NFQUEUE.

USAGE:
    hostblock [OPTIONS] <BLOCKLIST>

ARGS:
    <BLOCKLIST>    Blocklist file of <rank>,<hostname> lines

OPTIONS:
    -q, --queue <NUM>    NFQUEUE number to bind [default: 0]
    -h, --help           Print help information
    -V, --version        Print version information

ENVIRONMENT:
    HOSTBLOCK_LOG_LEVEL  Log level (trace, debug, info, warn, error)

REQUIREMENTS:
    - CAP_NET_ADMIN capability (or root)
    - iptables NFQUEUE rule directing traffic to the bound queue

EXAMPLE:
    iptables -A OUTPUT -p tcp --dport 80 -j NFQUEUE --queue-num 0
    sudo hostblock top-1m.txt
"#,
        hostblock::VERSION
    );
}

/// Initialize logging
fn init_logging() {
    let level = match std::env::var("HOSTBLOCK_LOG_LEVEL")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: &Args) -> Result<(), AppError> {
    let blocklist = BlockList::load(&args.blocklist_path)?;
    if blocklist.is_empty() {
        warn!("Blocklist is empty, every packet will be accepted");
    }

    let filter = HostFilter::new(blocklist);
    let stats = filter.stats();

    // The queue loop unbinds and closes on drop, so cleanup also runs when
    // this function returns an error.
    let mut queue = QueueLoop::open(QueueConfig {
        queue_num: args.queue_num,
        ..QueueConfig::default()
    })?;

    let result = queue.run(&filter).map_err(AppError::from);

    let snapshot = stats.snapshot();
    info!(
        "Final stats: {} received, {} blocked, {} allowed, {} without Host header, \
         {} malformed, {} not IPv4/TCP, {} queue overflows",
        snapshot.received,
        snapshot.blocked,
        snapshot.allowed,
        snapshot.no_host,
        snapshot.malformed,
        snapshot.skipped,
        snapshot.overflows
    );

    result
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    info!("hostblock v{}", hostblock::VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
