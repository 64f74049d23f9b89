use crate::AppError::ConfigError;
use clap::{ArgGroup, Parser};
use report::Report;
use smfdump::{SmfError, SmfReader};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

mod report;

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("smfdump=info"))
        .init();

    // args
    let args = CliArgs::parse();
    let file_path = PathBuf::from(&args.file);

    // check if MIDI file exists
    if !file_path.exists() {
        let err = ConfigError(format!("MIDI file not found {file_path:?}"));
        return Err(err);
    }
    log::debug!("Reading MIDI file {file_path:?}");

    let file = File::open(&file_path)?;
    let reader = SmfReader::new(BufReader::new(file))?;

    // go!
    match args.track {
        Some(index) => {
            let outcome = report::track(reader, index, args.skip_unknown_meta)?;
            print_report(&outcome.report, args.json)?;
            if let Some(err) = outcome.error {
                return Err(err.into());
            }
        }
        None => {
            let report = report::list(reader)?;
            print_report(&report, args.json)?;
        }
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["list", "track"])))]
pub struct CliArgs {
    /// Path to the Standard MIDI File.
    #[arg(default_value = "song.mid")]
    file: String,
    /// List the header and the size of every track.
    #[arg(short, long)]
    list: bool,
    /// Decode the events of the track at this index.
    #[arg(short, long, value_name = "TRACK_NUMBER")]
    track: Option<usize>,
    /// Continue past meta events with an unrecognized type.
    #[arg(long, default_value_t = false)]
    skip_unknown_meta: bool,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<SmfError> for AppError {
    fn from(error: SmfError) -> Self {
        match error {
            SmfError::TrackNotFound { .. } => Self::ConfigError(error.to_string()),
            SmfError::IoError(s) => Self::OtherError(s),
            SmfError::Header(_) | SmfError::Track { .. } | SmfError::Event { .. } => {
                Self::ParsingError(error.to_string())
            }
        }
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}
