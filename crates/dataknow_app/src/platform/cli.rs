use std::path::PathBuf;

use clap::Parser;

use super::config::LanguageCode;
use super::logging::LogDestination;

/// Upload documents, run an analysis job and download the reports.
#[derive(Debug, Parser)]
#[command(name = "dataknow", version)]
pub struct Cli {
    /// Documents to submit (pdf, doc, docx, xls, xlsx, txt, csv).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// RON configuration file. A missing file means defaults.
    #[arg(long, default_value = "dataknow.ron")]
    pub config: PathBuf,

    /// Base URL of the analysis service. Without one the built-in simulator is used.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Directory downloaded reports are written to.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Language the summaries are written in.
    #[arg(long, value_enum)]
    pub language: Option<LanguageCode>,

    /// Also generate a custom analysis for this prompt once the main job completes.
    #[arg(long)]
    pub prompt: Option<String>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,
}
