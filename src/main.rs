use clap::Parser;
use pco2_processor::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Cancellation token coordinates graceful shutdown with the workers
        let cancellation_token = CancellationToken::new();

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
            cancellation_token.cancel();
        };

        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(pco2_processor::Error::processing_interrupted(
                    "Processing interrupted by user",
                ))
            }
        }
    });

    match result {
        Ok(_stats) => {
            // Stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("pCO₂ Processor - CO₂ measurement reduction and quality control");
    println!("==============================================================");
    println!();
    println!("Aligns irregular CO₂ instrument readings into measurements, calculates");
    println!("pCO₂/fCO₂ and runs the automatic QC cascade.");
    println!();
    println!("USAGE:");
    println!("    pco2-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process         Process dataset JSON files (main command)");
    println!("    check-config    Validate configuration and show the sensor type graph");
    println!("    help            Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Process every dataset in a directory:");
    println!("    pco2-processor process data/ --output reduced/");
    println!();
    println!("    # Process matching files as CSV with four workers:");
    println!("    pco2-processor process 'data/cruise-*.json' --format csv -j 4");
    println!();
    println!("    # Check a configuration file:");
    println!("    pco2-processor check-config --config my-config.toml");
    println!();
    println!("For detailed help on any command, use:");
    println!("    pco2-processor <COMMAND> --help");
}
