use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use forecast_api::{
    config::{self, AppConfig},
    handlers::forecasts::{ForecastRequestBody, ScenarioInput},
    ml::ModelStore,
    models::{Category, ForecastHorizon, Platform},
    reports,
    services::{
        Clock, FeedbackService, FeedbackSubmission, ForecastReport, ForecastingService,
        SystemClock,
    },
};
use serde::Serialize;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    match cli.command {
        Commands::Models => handle_models_command(&context, cli.json).await?,
        Commands::Forecast(args) => handle_forecast_command(&context, args, cli.json).await?,
        Commands::Feedback(args) => handle_feedback_command(&context, args, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "forecast", about = "Video game sales forecasting from the terminal", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known models and whether their artifacts are present
    Models,
    /// Run a forecast for one model and scenario
    Forecast(ForecastArgs),
    /// Append a message to the feedback file
    Feedback(FeedbackArgs),
}

#[derive(Args)]
struct ForecastArgs {
    #[arg(long, help = "Model to run: arima, holt_winters, ses or sarima")]
    model: String,
    #[arg(long, default_value_t = ForecastHorizon::DEFAULT, help = "Months to forecast (1-12)")]
    horizon: u32,
    #[arg(long, default_value_t = 0, help = "Day of week, 0 = Monday through 6 = Sunday")]
    day_of_week: u8,
    #[arg(long, action = ArgAction::SetTrue, help = "Forecast with a promotion running")]
    promotion: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Forecast over a holiday")]
    holiday: bool,
    #[arg(long, default_value_t = Category::Sports.to_string(), help = "Game category")]
    category: String,
    #[arg(long, default_value_t = Platform::Xbox.to_string(), help = "Platform")]
    platform: String,
    #[arg(long, help = "Also write the forecast as CSV to this path")]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct FeedbackArgs {
    #[arg(long, default_value = "", help = "Your name")]
    name: String,
    #[arg(long, help = "Contact email address")]
    email: String,
    #[arg(long, help = "Feedback message")]
    message: String,
}

struct CliContext {
    config: AppConfig,
    clock: Arc<dyn Clock>,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load configuration")?;
        debug!(models_dir = %config.models_dir.display(), "CLI configuration loaded");

        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
        })
    }

    fn forecasting_service(&self) -> ForecastingService {
        let store = ModelStore::new(&self.config.models_dir, &self.config.feature_schema_file)
            .with_cache(false);
        ForecastingService::new(Arc::new(store), self.clock.clone())
    }

    fn feedback_service(&self) -> FeedbackService {
        FeedbackService::new(&self.config.feedback_file, self.clock.clone())
    }
}

async fn handle_models_command(context: &CliContext, json: bool) -> Result<()> {
    let models = context.forecasting_service().catalogue().await;

    if json {
        print_json(&models)?;
        return Ok(());
    }

    println!("{:<14} {:<22} {:<20} AVAILABLE", "SLUG", "MODEL", "ARTIFACT");
    for model in models {
        println!(
            "{:<14} {:<22} {:<20} {}",
            model.slug,
            model.display_name,
            model.artifact_file,
            if model.available { "yes" } else { "no" }
        );
    }
    Ok(())
}

async fn handle_forecast_command(
    context: &CliContext,
    args: ForecastArgs,
    json: bool,
) -> Result<()> {
    let body = ForecastRequestBody {
        model: args.model,
        horizon: args.horizon,
        scenario: Some(ScenarioInput {
            day_of_week: args.day_of_week,
            promotion: args.promotion,
            holiday: args.holiday,
            category: args.category,
            platform: args.platform,
        }),
    };
    let request = body.into_request().context("invalid forecast request")?;

    let report = context
        .forecasting_service()
        .run(&request)
        .await
        .with_context(|| format!("{} forecast failed", request.model.display_name()))?;

    if let Some(path) = args.csv.as_ref() {
        let csv = reports::to_csv(&report.result).context("failed to render CSV")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
        if !json {
            println!("CSV written to {}", path.display());
        }
    }

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn handle_feedback_command(
    context: &CliContext,
    args: FeedbackArgs,
    json: bool,
) -> Result<()> {
    let submission = FeedbackSubmission {
        name: args.name,
        email: args.email,
        message: args.message,
    };

    let service = context.feedback_service();
    let receipt = service
        .submit(&submission)
        .await
        .context("failed to record feedback")?;

    if json {
        print_json(&receipt)?;
    } else {
        println!("Thank you for your feedback!");
        println!("Saved to {}", service.path().display());
    }
    Ok(())
}

fn print_report(report: &ForecastReport) {
    println!(
        "{} ({}), {} month(s)",
        report.model_name,
        report.model_type,
        report.horizon.months()
    );
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    println!();
    println!("{:<10} {:>18}", reports::CSV_HEADER[0], reports::CSV_HEADER[1]);
    for row in &report.forecast {
        println!("{:<10} {:>18.2}", row.month, row.forecasted_sales);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{}", rendered);
    Ok(())
}
