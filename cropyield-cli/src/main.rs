mod output;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cropyield_advisor::{clean_reply, Advisor, Intent, Language};
use cropyield_inference::{FeatureMap, YieldPredictor};
use cropyield_trainer::{TrainConfig, Trainer};
use crossterm::style::Color;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "cropyield")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Crop-yield model training, prediction and farm advice", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train both candidates and persist the better one
    Train(TrainArgs),
    /// Predict the yield for one feature map
    Predict(PredictArgs),
    /// Answer a question with a filled reply template
    Ask(AskArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// TOML training config; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input CSV dataset
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Target column name
    #[arg(long)]
    target: Option<String>,

    /// Where to write the selected model
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the training report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Accept columns other than the crop-yield schema
    #[arg(long)]
    no_schema_check: bool,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Model artifact written by `train`
    #[arg(short, long)]
    model: PathBuf,

    /// Features as an inline JSON object
    #[arg(long, conflicts_with = "features_file", required_unless_present = "features_file")]
    features: Option<String>,

    /// Features as a JSON file
    #[arg(long)]
    features_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AskArgs {
    /// irrigation, fertilizer, pest, sowing, yield or rainfall
    #[arg(short, long, default_value = "irrigation")]
    intent: String,

    /// Reply language: en, hi or mr
    #[arg(short, long, default_value = "en")]
    lang: String,

    #[arg(long)]
    district: Option<String>,

    #[arg(long)]
    crop: Option<String>,

    /// Reference dataset for row lookup
    #[arg(long, default_value = "combined.csv")]
    data: PathBuf,

    /// Model artifact used when a row has no recorded yield
    #[arg(long)]
    model: Option<PathBuf>,

    /// Append prescriptive advice for the matched row
    #[arg(long)]
    advice: bool,

    /// Strip unrecorded-value markers from the reply
    #[arg(long)]
    clean: bool,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Train(args) => train(args),
        Command::Predict(args) => predict(args),
        Command::Ask(args) => ask(args),
    }
}

fn train_config(args: &TrainArgs) -> Result<TrainConfig> {
    let mut config = match &args.config {
        Some(path) => TrainConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrainConfig::default(),
    };
    if let Some(csv) = &args.csv {
        config.csv_path = csv.clone();
    }
    if let Some(target) = &args.target {
        config.target_column = target.clone();
    }
    if let Some(output) = &args.output {
        config.output_model_path = output.clone();
    }
    if args.no_schema_check {
        config.enforce_schema = false;
    }
    Ok(config)
}

fn train(args: TrainArgs) -> Result<()> {
    let config = train_config(&args)?;
    debug!(?config, "training configuration");

    let trainer = Trainer::new(config).context("Invalid training configuration")?;
    let report = trainer.run().context("Training failed")?;

    if let Some(path) = &args.report {
        let json = report.to_json_pretty().context("Failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    let mut stdout = io::stdout();
    output::training_summary(&mut stdout, &report)?;
    Ok(())
}

fn read_features(args: &PredictArgs) -> Result<FeatureMap> {
    let json = match (&args.features, &args.features_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read features file {}", path.display()))?,
        (None, None) => bail!("either --features or --features-file is required"),
    };
    serde_json::from_str(&json).context("Features must be a JSON object of column -> value")
}

fn predict(args: PredictArgs) -> Result<()> {
    let features = read_features(&args)?;
    let predictor = YieldPredictor::load(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;

    let prediction = predictor.predict(&features);
    let color = if prediction.is_available() {
        Color::Green
    } else {
        Color::Yellow
    };
    output::line(&mut io::stdout(), color, &prediction.to_string())?;
    Ok(())
}

fn ask(args: AskArgs) -> Result<()> {
    let predictor = match &args.model {
        Some(path) => YieldPredictor::load_or_unavailable(path),
        None => YieldPredictor::unavailable("no model configured"),
    };
    let advisor = Advisor::open(&args.data, predictor);

    let intent = Intent::from_tag(&args.intent);
    let lang = Language::from_code(&args.lang);
    debug!(%intent, %lang, "answering");

    let reply = advisor.reply(intent, lang, args.district.as_deref(), args.crop.as_deref());
    let reply = if args.clean { clean_reply(&reply) } else { reply };

    let mut stdout = io::stdout();
    writeln!(stdout, "{reply}")?;

    if args.advice {
        match advisor.advice(args.district.as_deref(), args.crop.as_deref()) {
            Some(advice) => {
                writeln!(stdout)?;
                output::line(&mut stdout, Color::Cyan, &advice)?;
            }
            None => output::line(&mut stdout, Color::DarkGrey, "no prescriptive advice for this row")?,
        }
    }
    Ok(())
}
