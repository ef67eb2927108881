use std::process::ExitCode;

use bytesize::ByteSize;
use chisel_batch::comparison::{
    run_with, ComparisonConfig, DEFAULT_BATCH_SIZE, DEFAULT_REPEAT_COUNT,
};
use clap::Parser;

/// Compare per-item and joined decoding of a batch of small JSON objects.
///
/// Set `RUST_LOG=debug` to see the individual timings as they are taken.
#[derive(Parser)]
#[command(name = "batch_comparison", version, long_about = None)]
struct Cli {
    #[arg(default_value_t = DEFAULT_BATCH_SIZE, help = "Number of payloads in the batch")]
    batch_size: usize,
    #[arg(default_value_t = DEFAULT_REPEAT_COUNT, help = "Times each strategy is run")]
    repeat_count: usize,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let config = ComparisonConfig {
        batch_size: cli.batch_size,
        repeat_count: cli.repeat_count,
    };

    let batch = config.sample_batch();
    let bytes: usize = batch.iter().map(String::len).sum();
    println!(
        "Decoding {} payloads ({}) {} times with each strategy",
        batch.len(),
        ByteSize(bytes as u64),
        config.repeat_count
    );

    match run_with(&config, &batch) {
        Ok(comparison) => {
            println!("{}", comparison.per_item);
            println!("{}", comparison.joined);
            if let Some(speedup) = comparison.speedup() {
                println!("joined decode was {:.2}x the speed of per-item", speedup);
            }
            println!("outputs match: {}", comparison.outputs_match());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::Cli;

    #[test]
    fn should_default_both_arguments() {
        let cli = Cli::try_parse_from(["batch_comparison"]).unwrap();
        assert_eq!(cli.batch_size, 1000);
        assert_eq!(cli.repeat_count, 100);
    }

    #[test]
    fn should_take_positional_arguments() {
        let cli = Cli::try_parse_from(["batch_comparison", "10", "3"]).unwrap();
        assert_eq!(cli.batch_size, 10);
        assert_eq!(cli.repeat_count, 3);
        assert!(Cli::try_parse_from(["batch_comparison", "ten"]).is_err());
    }
}
