mod commands;
mod terminal;

use commands::{CommandLine, Commands, capture, discover, interfaces, topology};
use lanscope_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    let log_file = match &commands.command {
        Commands::Capture(args) => Some(capture::log_file_path(args, &commands.output_dir)),
        _ => None,
    };
    logging::init(commands.quiet, log_file.as_deref())?;

    let cfg = Config {
        quiet: commands.quiet,
        no_vendor: commands.no_vendor,
        output_dir: commands.output_dir,
    };
    print::banner(cfg.quiet);

    match commands.command {
        Commands::Discover(args) => {
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(args, &cfg).await
        }
        Commands::Capture(args) => {
            print::header("starting capture", cfg.quiet);
            let log_file = capture::log_file_path(&args, &cfg.output_dir);
            capture::capture(args, &cfg, log_file).await
        }
        Commands::Topology(args) => topology::topology(args, &cfg),
        Commands::Interfaces => interfaces::interfaces(&cfg),
    }
}
