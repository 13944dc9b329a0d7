use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sfr_features::ColumnPolicy;
use sfr_service::{
    logging, ArtifactReport, ConfigOverrides, LogFormat, ServiceConfig, ServiceContext,
};
use std::path::PathBuf;
use std::sync::Arc;

fn cli() -> Command {
    Command::new("sfr-server")
        .version(sfr_service::VERSION)
        .about("Smart Fertilizer Recommender prediction service")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .global(true)
                .help("Bind host [env: SFR_HOST] [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .global(true)
                .value_parser(value_parser!(u16))
                .help("Bind port [env: SFR_PORT] [default: 8000]"),
        )
        .arg(
            Arg::new("artifact-dir")
                .long("artifact-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Model artifact directory [env: SFR_ARTIFACT_DIR] [default: models]"),
        )
        .arg(
            Arg::new("column-policy")
                .long("column-policy")
                .global(true)
                .value_parser(value_parser!(ColumnPolicy))
                .help("Missing feature column handling: zero_fill or strict"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(value_parser!(LogFormat))
                .help("Log output: text or json"),
        )
        .subcommand(Command::new("serve").about("Load artifacts and serve the HTTP API (default)"))
        .subcommand(
            Command::new("check-artifacts")
                .about("Load and validate artifacts, then print a report")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn overrides(args: &ArgMatches) -> ConfigOverrides {
    ConfigOverrides {
        host: args.get_one::<String>("host").cloned(),
        port: args.get_one::<u16>("port").copied(),
        artifact_dir: args.get_one::<PathBuf>("artifact-dir").cloned(),
        column_policy: args.get_one::<ColumnPolicy>("column-policy").copied(),
        log_format: args.get_one::<LogFormat>("log-format").copied(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let (command, args) = matches.subcommand().unwrap_or(("serve", &matches));

    let config_file = args.get_one::<PathBuf>("config");
    let config = ServiceConfig::resolve(config_file.map(PathBuf::as_path), &overrides(args))?;

    match command {
        "check-artifacts" => check_artifacts(&config, args.get_flag("json")),
        _ => run_server(config).await,
    }
}

async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    logging::init_tracing(config.log_format).map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(version = sfr_service::VERSION, "Starting Smart Fertilizer Recommender API");

    let ctx = ServiceContext::from_config(&config).context("failed to load model artifacts")?;
    let addr = config.socket_addr()?;

    sfr_service::serve(addr, Arc::new(ctx), shutdown_signal())
        .await
        .with_context(|| format!("failed to bind {addr}"))
}

fn check_artifacts(config: &ServiceConfig, json: bool) -> anyhow::Result<()> {
    let set = sfr_artifact::ModelArtifactSet::load(&config.artifact_dir)
        .context("artifact directory failed validation")?;
    let report = ArtifactReport::from_set(&config.artifact_dir, &set);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    if !report.is_ready() {
        std::process::exit(1);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C, graceful shutdown disabled: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
