use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quran_srt::pipeline::{raw_srt_path, write_raw_srt};
use quran_srt::transcript::JsonTranscript;
use quran_srt::{Corpus, JsonDirProvider, MergeConfig, ProcessOptions, ProcessReport, process_file};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Align recited-Quran captions to verse text")]
struct Cli {
    /// Directory holding surahs.json and json/surah/surah_<id>.json
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Log per-segment decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Align an .srt file and write <stem>_processed.srt and <stem>_sura_ranges.txt
    Process {
        input: PathBuf,

        #[command(flatten)]
        opts: AlignArgs,
    },
    /// Turn a JSON transcript into <stem>_raw.srt, then process it
    Transcript {
        input: PathBuf,

        #[command(flatten)]
        opts: AlignArgs,
    },
    /// List the chapters of the reference corpus
    Chapters,
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Chapter to match against (repeatable); detected from the text when omitted
    #[arg(short, long = "chapter")]
    chapters: Vec<u32>,

    /// Minimum words per merged caption
    #[arg(long, default_value_t = MergeConfig::DEFAULT_MIN_WORDS)]
    min_words: usize,

    /// Merge short neighbouring captions
    #[arg(long)]
    merge: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl AlignArgs {
    fn options(&self) -> ProcessOptions {
        ProcessOptions {
            chapters: self.chapters.clone(),
            merge_enabled: self.merge,
            merge: MergeConfig {
                min_words: self.min_words,
                ..MergeConfig::default()
            },
            ..ProcessOptions::default()
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_corpus(data_dir: &Path) -> Result<Corpus> {
    let provider = JsonDirProvider::new(data_dir);
    Corpus::load(&provider)
        .with_context(|| format!("Failed loading corpus from {}", data_dir.display()))
}

fn run_process(input: &Path, corpus: &Corpus, args: &AlignArgs) -> Result<()> {
    let report = process_file(input, corpus, &args.options())
        .with_context(|| format!("Failed processing {}", input.display()))?;
    print_report(&report, args.json)
}

fn print_report(report: &ProcessReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report).context("Failed serializing report")?);
        return Ok(());
    }

    if let Some(chapter) = report.detected_chapter {
        println!("Detected chapter: {chapter}");
    }
    println!("Captions:  {}", report.total_captions);
    println!("Matched:   {}", report.matched);
    println!("Unmatched: {}", report.unmatched);
    println!("Output:    {}", report.processed_srt_path.display());
    println!("Ranges:    {}", report.ranges_path.display());
    println!("Backup:    {}", report.backup_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Process { input, opts } => {
            let corpus = load_corpus(&cli.data_dir)?;
            run_process(input, &corpus, opts)
        }
        Command::Transcript { input, opts } => {
            let raw = raw_srt_path(input);
            write_raw_srt(&JsonTranscript::new(input), &raw)
                .with_context(|| format!("Failed converting {} -> {}", input.display(), raw.display()))?;
            let corpus = load_corpus(&cli.data_dir)?;
            run_process(&raw, &corpus, opts)
        }
        Command::Chapters => {
            let corpus = load_corpus(&cli.data_dir)?;
            for chapter in corpus.chapters() {
                let loaded = corpus.verses(chapter.id).len();
                println!(
                    "{:>3}  {}  {}  ({}/{} verses)",
                    chapter.id,
                    chapter.name,
                    chapter.name_en.as_deref().unwrap_or("-"),
                    loaded,
                    chapter.verse_count
                );
            }
            Ok(())
        }
    }
}
