use anyhow::Context;
use clap::{value_parser, Arg, Command};
use sfr_client::{render_result, render_summary, Form, PredictionClient, DEFAULT_API_URL};
use sfr_features::InputRecord;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("sfr-form")
        .version(sfr_client::VERSION)
        .about("Smart Fertilizer Recommender input form")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .env("SFR_API_URL")
                .default_value(DEFAULT_API_URL)
                .help("Prediction endpoint"),
        )
        .arg(
            Arg::new("timeout-secs")
                .long("timeout-secs")
                .default_value("30")
                .value_parser(value_parser!(u64))
                .help("Request timeout in seconds"),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .value_parser(value_parser!(PathBuf))
                .help("Read the record from a JSON file instead of prompting"),
        )
}

fn read_record(path: Option<&PathBuf>) -> anyhow::Result<InputRecord> {
    let Some(path) = path else {
        let stdin = io::stdin();
        return Form::new(stdin.lock(), io::stdout()).fill().context("form input failed");
    };

    let contents = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let record: InputRecord =
        serde_json::from_str(&contents).with_context(|| format!("{} is not a valid record", path.display()))?;
    if let Err(errors) = record.validate() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("invalid record in {}:\n  {}", path.display(), messages.join("\n  "));
    }
    Ok(record)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let matches = cli().get_matches();
    let url = matches
        .get_one::<String>("api-url")
        .map_or(DEFAULT_API_URL, String::as_str);
    let timeout = matches.get_one::<u64>("timeout-secs").copied().unwrap_or(30);

    let record = read_record(matches.get_one::<PathBuf>("input"))?;
    let client = PredictionClient::new(url, Duration::from_secs(timeout))?;

    match client.predict(&record).await {
        Ok(result) => {
            println!();
            print!("{}", render_result(&result));
            println!();
            print!("{}", render_summary(&record));
            Ok(())
        }
        Err(e) if e.is_connection() => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("⚠️ {e}");
            std::process::exit(1);
        }
    }
}
