use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use signet_runner::{Config, Flow, Runner};

#[derive(Parser)]
#[command(name = "signet-runner")]
#[command(about = "Account sign-up/sign-in E2E flows with OTP verification")]
#[command(version)]
struct Cli {
    /// Flow to run
    #[arg(value_enum)]
    flow: FlowArg,

    /// Config file (compiled-in defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the inbox browser in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Report output path (overrides config)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlowArg {
    Signup,
    Signin,
}

impl From<FlowArg> for Flow {
    fn from(arg: FlowArg) -> Self {
        match arg {
            FlowArg::Signup => Flow::Signup,
            FlowArg::Signin => Flow::Signin,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(ref report) = cli.report {
        config.report.path = report.display().to_string();
    }

    if cli.check {
        println!("Config valid: {}", config.name);
        println!("  App window: {}", config.app.window_title);
        println!("  Account window: {}", config.account.window_title);
        println!("  Inbox: {}", config.inbox.url);
        println!(
            "  Inbox wait: {}s (poll every {}s)",
            config.inbox.max_wait_secs, config.inbox.poll_interval_secs
        );
        println!("  Report: {}", config.report.path);
        return Ok(());
    }

    let flow: Flow = cli.flow.into();
    println!("Running: {} [{flow}]", config.name);

    let runner = Runner::new(config);
    let summary = runner.run(flow).await?;

    // Step failures surface through the report, not the exit code.
    println!();
    if summary.succeeded {
        println!("✓ All steps passed");
    } else {
        println!("✗ Some steps failed (see report)");
    }
    println!("  Steps: {}", summary.steps);
    println!("  Duration: {}ms", summary.duration_ms);
    println!("  Report: {}", summary.report_path.display());

    Ok(())
}
