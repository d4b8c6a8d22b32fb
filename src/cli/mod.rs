use crate::{
    build_prompt, BudgetLevel, CancelHandle, EnvApiKey, EstimateError, Estimator,
    EstimatorConfig, RetryPolicy, StaticApiKey, TravelMode, TripRequest,
};
use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use std::{process::ExitCode, time::Duration};
use tracing::{error, info};

fn command() -> Command {
    Command::new("trip-budget")
        .version("0.1.0")
        .about("Estimate the cost of a temple trip with an LLM inference API")
        .arg(
            Arg::new("from")
                .short('f')
                .long("from")
                .value_name("CITY")
                .help("Where the trip starts")
                .required(true),
        )
        .arg(
            Arg::new("to")
                .short('t')
                .long("to")
                .value_name("TEMPLE")
                .help("Temple destination")
                .required(true),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Travel mode: flight, train or car")
                .default_value("flight"),
        )
        .arg(
            Arg::new("days")
                .short('d')
                .long("days")
                .value_name("DAYS")
                .help("Trip duration in days")
                .default_value("3"),
        )
        .arg(
            Arg::new("date")
                .long("date")
                .value_name("DATE")
                .help("Travel date (free text, e.g. 03/14/2026)"),
        )
        .arg(
            Arg::new("travelers")
                .short('n')
                .long("travelers")
                .value_name("COUNT")
                .help("Number of travelers")
                .default_value("2"),
        )
        .arg(
            Arg::new("budget")
                .short('b')
                .long("budget")
                .value_name("LEVEL")
                .help("Budget level: budget, medium or luxury")
                .default_value("medium"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_name("MODEL")
                .help("Inference model (or set TRIP_BUDGET_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Inference API key (or set GROQ_API_KEY / OPENAI_API_KEY)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Inference base URL (or set GROQ_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout in seconds (or set TRIP_BUDGET_TIMEOUT_SECS)"),
        )
        .arg(
            Arg::new("retry")
                .long("retry")
                .value_name("POLICY")
                .help("Retry policy: never or once (or set TRIP_BUDGET_RETRY)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the normalized estimate as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("prompt-only")
                .long("prompt-only")
                .help("Print the prompt that would be sent and exit")
                .action(ArgAction::SetTrue),
        )
}

/// CLI entry point for the trip-budget tool.
///
/// Invalid arguments surface as `Err`; a failed estimate prints only its
/// user-facing message and yields a failure exit code.
pub async fn run() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let matches = command().get_matches();
    let arg = |name: &str| matches.get_one::<String>(name).cloned().unwrap_or_default();

    let request = TripRequest::builder()
        .origin(arg("from"))
        .destination(arg("to"))
        .travel_mode(arg("mode").parse::<TravelMode>()?)
        .duration_days(arg("days").parse().context("--days must be a whole number")?)
        .travel_date(arg("date"))
        .traveler_count(arg("travelers").parse().context("--travelers must be a whole number")?)
        .budget_level(arg("budget").parse::<BudgetLevel>()?)
        .build()?;

    if matches.get_flag("prompt-only") {
        println!("{}", build_prompt(&request));
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = EstimatorConfig::from_env()?;
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model(model.as_str());
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(timeout) = matches.get_one::<String>("timeout") {
        let seconds: u64 = timeout.parse().context("--timeout must be a whole number")?;
        config = config.with_timeout(Duration::from_secs(seconds));
    }
    if let Some(retry) = matches.get_one::<String>("retry") {
        config = config.with_retry(retry.parse::<RetryPolicy>()?);
    }

    info!("Using model: {}", config.model);
    info!("Base URL: {}", config.base_url);

    let estimator = match matches.get_one::<String>("api-key") {
        Some(key) => Estimator::new(config, StaticApiKey::new(key.as_str())),
        None => Estimator::new(config, EnvApiKey::default()),
    };

    let cancel = CancelHandle::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match estimator.estimate_with_cancel(&request, &cancel).await {
        Ok(breakdown) => {
            if matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&breakdown)?);
            } else {
                println!("{}", breakdown.summary(&request));
            }
            info!("Estimate completed successfully");
        }
        Err(e) => return Ok(report_failure(&e)),
    }

    Ok(ExitCode::SUCCESS)
}

fn report_failure(err: &EstimateError) -> ExitCode {
    error!(code = err.error_code(), "Estimation failed: {}", err);
    eprintln!("{}", err.user_message());
    ExitCode::FAILURE
}
