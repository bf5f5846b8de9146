//! # svmlight
//!
//! Command-line front end for the vector file operations.
//!
//! ```bash
//! svmlight describe features.txt.gz
//! svmlight cut -f 1,3-5 --renumbering features.txt > subset.txt
//! svmlight join lexical.txt semantic.txt -o all.txt
//! svmlight split -k 5 -r --seed 7 -c features.txt
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use svmlight_tools::io::{AtomicOutput, open_path};
use svmlight_tools::ops::{
    self, CutOptions, FieldList, NormalizeMethod, NormalizeOptions, ShuffleOptions,
    SplitOptions, ZeroRangePolicy,
};
use svmlight_tools::{CountProgress, RowObserver};

/// Tools for query-grouped feature vectors in the SVMLight format
#[derive(Parser)]
#[command(name = "svmlight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log progress every N rows (needs -v)
    #[arg(long, value_name = "N", default_value = "10000", global = true)]
    progress: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the preamble
    Describe {
        vector_file: PathBuf,
    },

    /// Cut and print a select subset of features
    Cut {
        /// Select only these fields, e.g. 1,3-5
        #[arg(short = 'f', value_name = "LIST")]
        fields: Option<FieldList>,

        /// Renumber the selected feature ids from 1
        #[arg(long)]
        renumbering: bool,

        vector_file: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge multiple sets of features
    Join {
        #[arg(required = true, num_args = 2..)]
        vector_files: Vec<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Shuffle the data on query topic
    Shuffle {
        /// Use a fixed seed for a reproducible order
        #[arg(long)]
        seed: Option<u64>,

        vector_file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split data into a select number of folds
    Split {
        /// Number of folds
        #[arg(short, default_value = "5")]
        k: usize,

        /// Prefix of output files (default: name of vector_file)
        #[arg(long)]
        prefix: Option<PathBuf>,

        /// Use random partition rather than sequential
        #[arg(short, long)]
        random: bool,

        /// Seed for --random
        #[arg(long, requires = "random")]
        seed: Option<u64>,

        /// Output training sets as well
        #[arg(short, long)]
        complete: bool,

        /// Also write the qid to fold assignment as JSON
        #[arg(long, value_name = "FILE")]
        assignment: Option<PathBuf>,

        vector_file: PathBuf,
    },

    /// Normalize feature values within each query
    Normalize {
        /// Normalization method
        #[arg(short, default_value = "minmax")]
        method: NormalizeMethod,

        /// Value for features that are constant within a query: zero, omit, error
        #[arg(long, default_value = "zero")]
        zero_range: ZeroRangePolicy,

        vector_file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Stdout, or an atomic file committed by [`Sink::finish`].
enum Sink {
    Stdout(io::BufWriter<io::Stdout>),
    File(AtomicOutput),
}

impl Sink {
    fn open(path: Option<&Path>) -> Result<Self> {
        Ok(match path {
            Some(p) => Sink::File(AtomicOutput::create(p)?),
            None => Sink::Stdout(io::BufWriter::new(io::stdout())),
        })
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Sink::Stdout(w) => w,
            Sink::File(f) => f,
        }
    }

    fn finish(self) -> Result<()> {
        match self {
            Sink::Stdout(mut w) => w.flush().context("flush stdout"),
            Sink::File(f) => {
                let path = f.commit()?;
                info!("wrote {}", path.display());
                Ok(())
            }
        }
    }
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    open_path(path).with_context(|| format!("open {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut progress = CountProgress::new(cli.progress);
    let observer: &mut dyn RowObserver = &mut progress;

    match cli.command {
        Commands::Describe { vector_file } => {
            let mut sink = Sink::open(None)?;
            ops::describe(open_input(&vector_file)?, sink.writer())?;
            sink.finish()?;
        }

        Commands::Cut {
            fields,
            renumbering,
            vector_file,
            output,
        } => {
            let Some(fields) = fields.filter(|f| !f.is_empty()) else {
                bail!("must specify a list of fields");
            };
            let options = CutOptions::new(fields).renumber(renumbering);
            let mut sink = Sink::open(output.as_deref())?;
            ops::cut(open_input(&vector_file)?, sink.writer(), &options, observer)?;
            sink.finish()?;
        }

        Commands::Join {
            vector_files,
            output,
        } => {
            let inputs = vector_files
                .iter()
                .map(|p| open_input(p))
                .collect::<Result<Vec<_>>>()?;
            let mut sink = Sink::open(output.as_deref())?;
            ops::join(inputs, sink.writer(), observer)?;
            sink.finish()?;
        }

        Commands::Shuffle {
            seed,
            vector_file,
            output,
        } => {
            let mut sink = Sink::open(output.as_deref())?;
            ops::shuffle(
                open_input(&vector_file)?,
                sink.writer(),
                &ShuffleOptions { seed },
                observer,
            )?;
            sink.finish()?;
        }

        Commands::Split {
            k,
            prefix,
            random,
            seed,
            complete,
            assignment,
            vector_file,
        } => {
            let options = SplitOptions {
                k,
                random,
                complete,
                seed,
            };
            let prefix = prefix.unwrap_or_else(|| vector_file.clone());
            let folds = ops::split_files(&vector_file, &prefix, &options, observer)
                .with_context(|| format!("split {}", vector_file.display()))?;
            if let Some(path) = assignment {
                let mut out = AtomicOutput::create(&path)?;
                serde_json::to_writer_pretty(&mut out, &folds)
                    .with_context(|| format!("serialize fold assignment to {}", path.display()))?;
                out.write_all(b"\n")?;
                out.commit()?;
            }
        }

        Commands::Normalize {
            method,
            zero_range,
            vector_file,
            output,
        } => {
            let options = NormalizeOptions { method, zero_range };
            let mut sink = Sink::open(output.as_deref())?;
            ops::normalize(vector_file.as_path(), sink.writer(), &options, observer)?;
            sink.finish()?;
        }
    }
    Ok(())
}
