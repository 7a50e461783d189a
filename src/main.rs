use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, error::ErrorKind};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use podcast2video::{
    ConvertOptions, ExternalTools, FrameSize, NoopReporter, ProgressEvent, ProgressReporter,
    ReqwestClient, RunOptions, SharedProgressReporter, is_url, run,
};

// Emoji with fallback for terminals without Unicode support
static CLAPPER: Emoji<'_, '_> = Emoji("🎬 ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "[*] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "[=] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[?] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Turn podcast episodes into videos with a static cover-art frame
#[derive(Parser, Debug)]
#[command(name = "podcast2video")]
#[command(about = "Turn podcast episodes from an RSS feed into videos")]
#[command(version)]
struct Args {
    /// RSS feed URL or path to local RSS file
    feed: String,

    /// Convert every episode instead of only the newest
    #[arg(long)]
    all: bool,

    /// Video frame size
    #[arg(short, long, value_enum, default_value_t = FrameSize::Hd1080)]
    resolution: FrameSize,

    /// Directory in which the podcast's video directory is created
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Directory for per-episode scratch files (defaults to the system temp dir)
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// ImageMagick `convert` executable
    #[arg(long, default_value = "convert")]
    convert_bin: String,

    /// ffmpeg executable
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg_bin: String,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

/// Progress reporter using an indicatif spinner for terminal output
struct IndicatifReporter {
    spinner: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        Self { spinner }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingFeed { url } => {
                self.spinner
                    .set_message(format!("{SEARCH}Fetching feed: {}", url.cyan()));
            }

            ProgressEvent::ParsingFeed { source } => {
                self.spinner
                    .set_message(format!("{SEARCH}Parsing feed: {}", source.cyan()));
            }

            ProgressEvent::FeedParsed {
                podcast_title,
                total_episodes,
                to_process,
                ..
            } => {
                self.spinner.println(format!(
                    "{HEADPHONES}{} • {} episodes in feed, converting {}",
                    podcast_title.bold().green(),
                    total_episodes.to_string().cyan(),
                    to_process.to_string().yellow()
                ));
            }

            ProgressEvent::EpisodeStarting {
                episode_title,
                episode_index,
                total_to_process,
            } => {
                self.spinner.set_message(format!(
                    "[{}/{}] {}",
                    (episode_index + 1).to_string().cyan(),
                    total_to_process.to_string().cyan(),
                    truncate_title(&episode_title, 50)
                ));
            }

            ProgressEvent::EpisodeSkipped {
                episode_title,
                output_path,
            } => {
                self.spinner.println(format!(
                    "{SKIP}{} {}",
                    truncate_title(&episode_title, 40).yellow(),
                    format!("(already at {})", output_path.display()).dimmed()
                ));
            }

            ProgressEvent::Downloading { url } => {
                self.spinner
                    .set_message(format!("{DOWNLOAD}Downloading {}", url.dimmed()));
            }

            ProgressEvent::DownloadSkipped { path } => {
                self.spinner.println(format!(
                    "  {SKIP}{}",
                    format!("Already downloaded {}", path.display()).dimmed()
                ));
            }

            ProgressEvent::DownloadFailed { url, error } => {
                self.spinner
                    .println(format!("  {WARNING}{} {}", url.yellow(), error.red()));
            }

            ProgressEvent::StageStarting {
                episode_title,
                stage,
            } => {
                self.spinner.set_message(format!(
                    "{GEAR}{} • {}",
                    stage.label(),
                    truncate_title(&episode_title, 40)
                ));
            }

            ProgressEvent::SilentVideoReused { path } => {
                self.spinner.println(format!(
                    "  {SKIP}{}",
                    format!("Reusing silent video {}", path.display()).dimmed()
                ));
            }

            ProgressEvent::EpisodeCompleted {
                episode_title,
                output_path,
            } => {
                self.spinner.println(format!(
                    "{SUCCESS}{} {}",
                    truncate_title(&episode_title, 40).green(),
                    output_path.display().to_string().dimmed()
                ));
            }

            ProgressEvent::EpisodeFailed {
                episode_title,
                error,
            } => {
                self.spinner.println(format!(
                    "{FAILURE}{} - {}",
                    truncate_title(&episode_title, 30).red(),
                    error.red()
                ));
            }

            ProgressEvent::WorkspaceCleanupFailed { path, error } => {
                self.spinner.println(format!(
                    "  {WARNING}Could not remove {}: {}",
                    path.display(),
                    error.yellow()
                ));
            }

            ProgressEvent::RunCompleted {
                converted_count,
                skipped_count,
                failed_count,
            } => {
                self.spinner.finish_and_clear();
                println!(
                    "\n{PARTY}{} {} converted, {} skipped, {} failed",
                    "Done:".bold().green(),
                    converted_count.to_string().green().bold(),
                    skipped_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let cut: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !is_url(&args.feed) && !Path::new(&args.feed).is_file() {
        Args::command()
            .error(
                ErrorKind::ValueValidation,
                format!(
                    "'{}' is neither an http(s) URL nor an existing feed file",
                    args.feed
                ),
            )
            .exit();
    }

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            CLAPPER,
            "podcast2video".bold().magenta(),
            "- Podcast to Video".dimmed()
        );
    }

    let client = ReqwestClient::new();
    let tools = ExternalTools::new(&args.convert_bin, &args.ffmpeg_bin);

    let options = RunOptions {
        process_all: args.all,
        output_root: args.output_dir.clone(),
        convert: ConvertOptions {
            frame: args.resolution,
            workspace_root: args.temp_dir.clone(),
        },
    };

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(IndicatifReporter::new())
    };

    let result = run(&client, &tools, &args.feed, &options, reporter)
        .await
        .context("Failed to process podcast feed")?;

    if !args.quiet && !result.failed_episodes.is_empty() {
        println!("\n{}", "Failed episodes:".red().bold());
        for (title, error) in &result.failed_episodes {
            println!("  {}{} - {}", CROSS, title.yellow(), error.dimmed());
        }
    }

    if !args.quiet {
        println!(
            "\n{FOLDER}Output: {}\n",
            result.output_dir.display().to_string().cyan()
        );
    }

    if result.all_failed() {
        std::process::exit(1);
    }

    Ok(())
}
