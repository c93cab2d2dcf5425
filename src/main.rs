use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use lat_prep::{
    logging, open_history_store, AppConfig, ClearScope, HistoryFilter, HistoryKind, Quiz, QuizError,
    Start,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file to load the questions from
    #[arg(short, long)]
    questions: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for history and the log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Fixed seed for question and option shuffling
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a practice quiz right away
    Quiz {
        /// Subject to practise; all subjects when omitted
        #[arg(short, long)]
        subject: Option<String>,
    },
    /// Start a timed mock exam
    Mock,
    /// Show or clear past attempts
    History {
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// Delete the selected history instead of showing it
        #[arg(long)]
        clear: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Quiz,
    Mock,
}

impl From<KindArg> for HistoryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Quiz => HistoryKind::Quiz,
            KindArg::Mock => HistoryKind::Mock,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), QuizError> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(questions) = args.questions {
        config.questions_path = questions;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    if let Ok(dir) = config.data_dir() {
        if let Err(e) = logging::init(&dir, &config.log_filter) {
            eprintln!("warning: logging disabled: {}", e);
        }
    }
    info!(questions = %config.questions_path.display(), "starting");

    let start = match args.command {
        None => Start::Menu,
        Some(Command::Quiz { subject }) => Start::Quiz(subject),
        Some(Command::Mock) => Start::Mock,
        Some(Command::History { kind, clear: true }) => {
            let scope = kind.map_or(ClearScope::All, |k| ClearScope::Kind(k.into()));
            open_history_store(&config).clear(scope)?;
            println!("History cleared.");
            return Ok(());
        }
        Some(Command::History { kind, clear: false }) => Start::History(match kind {
            None => HistoryFilter::All,
            Some(KindArg::Quiz) => HistoryFilter::Quiz,
            Some(KindArg::Mock) => HistoryFilter::Mock,
        }),
    };

    let mut quiz = Quiz::from_config(config)?;
    quiz.open(start);
    quiz.run().await
}
