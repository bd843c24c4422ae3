use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};

use pass_studio::draw::script::StrokeScript;
use pass_studio::draw::{BackgroundStatus, CanvasSurface, DefaultLoader, ExportOutcome, ExportSession};
use pass_studio::lyrics::LyricsClient;
use pass_studio::settings::Settings;
use pass_studio::sink::{self, Notifier};

/// Draw a pass over the background image and submit it, or query the
/// lyrics analyzer.
#[derive(Parser, Debug)]
#[command(name = "pass_studio", version, about = "Pass drawing pad and lyrics analyzer client")]
struct Cli {
    /// Settings file (JSON). Missing or empty files fall back to defaults.
    #[arg(long, default_value = "settings.json", value_name = "FILE")]
    settings: String,

    /// Enable debug logging (RUST_LOG is honoured in this mode).
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the canvas, replay strokes and export it to the configured sink.
    Export {
        #[command(flatten)]
        draw: DrawArgs,
    },
    /// Export, then send the pass off for signing.
    Sign {
        #[command(flatten)]
        draw: DrawArgs,
    },
    /// List an artist's albums.
    Albums { artist: String },
    /// Count a word across an album's lyrics.
    Analyze {
        artist: String,
        album: String,
        word: String,
    },
    /// Fetch an album word cloud as PNG.
    Wordcloud {
        artist: String,
        album: String,
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct DrawArgs {
    /// Submitter handle stored with the pass.
    #[arg(long, default_value = "")]
    handle: String,

    /// JSON stroke script recorded from pointer input.
    #[arg(long, value_name = "FILE")]
    strokes: Option<PathBuf>,

    /// Also write the flattened PNG here.
    #[arg(long, value_name = "FILE")]
    output_png: Option<PathBuf>,

    /// Override the background image URL or path.
    #[arg(long, value_name = "URL|PATH")]
    background: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(&cli.settings)?;
    pass_studio::logging::init(cli.debug || settings.debug_logging, settings.log_file.clone());
    tracing::debug!(settings = %cli.settings, "settings loaded");

    match cli.command {
        Command::Export { draw } => {
            let mut session = ExportSession::new();
            export_pass(&settings, &draw, &mut session)?;
            Ok(())
        }
        Command::Sign { draw } => {
            let notifier = sink::build_notifier(settings.notification.as_ref(), settings.http_timeout())?
                .ok_or_else(|| anyhow!("signing needs a `notification` section in {}", cli.settings))?;
            let mut session = ExportSession::new();
            if !export_pass(&settings, &draw, &mut session)? {
                return Ok(());
            }
            session
                .request_signing(&notifier as &dyn Notifier)
                .context("there was an error submitting your pass; please try again")?;
            println!("Your pass has been submitted for signing.");
            Ok(())
        }
        Command::Albums { artist } => {
            let client = lyrics_client(&settings)?;
            let albums = client.albums(&artist)?;
            if albums.is_empty() {
                println!("No albums found for {artist}.");
            }
            for album in albums {
                println!("{}\t{}", album.id, album.name);
            }
            Ok(())
        }
        Command::Analyze { artist, album, word } => {
            let client = lyrics_client(&settings)?;
            let count = client.analyze(&artist, &album, &word)?;
            let source = if count.cached { " (cached)" } else { "" };
            println!("\"{word}\" appears {} times in {album}{source}", count.count);
            if let Some(art) = count.album_art {
                println!("album art: {art}");
            }
            Ok(())
        }
        Command::Wordcloud { artist, album, out } => {
            let client = lyrics_client(&settings)?;
            let png = client.wordcloud(&artist, &album)?;
            write_file(&out, &png)?;
            println!("word cloud written to {}", out.display());
            Ok(())
        }
    }
}

/// Returns `false` when the export was skipped for lack of a handle.
fn export_pass(settings: &Settings, draw: &DrawArgs, session: &mut ExportSession) -> anyhow::Result<bool> {
    let timeout = settings.http_timeout();
    let loader = DefaultLoader::new(timeout)?;
    let background = draw
        .background
        .clone()
        .unwrap_or_else(|| settings.background_image.clone());

    let mut surface = CanvasSurface::new(settings.canvas_width, settings.canvas_height);
    if let BackgroundStatus::Missing { reason } = surface.initialize(&background, &loader) {
        eprintln!("warning: background image not drawn ({reason}); exporting on white");
    }

    if let Some(path) = &draw.strokes {
        let script = StrokeScript::load(path)?;
        let painted = script.replay(&mut surface, settings.tool_widths())?;
        tracing::info!(painted, "strokes replayed");
    }

    let sink = sink::build_sink(&settings.sink, timeout)?;
    match session.export(surface.buffer(), &draw.handle, sink.as_ref(), Utc::now())? {
        ExportOutcome::Skipped => {
            eprintln!("Please enter your Twitter username to save your pass");
            Ok(false)
        }
        ExportOutcome::Submitted(record) => {
            if let Some(path) = &draw.output_png {
                write_file(path, &record.png_bytes()?)?;
            }
            println!(
                "Pass saved for {} on {} via {}.",
                record.submitter_handle,
                record.date_submitted,
                sink.name()
            );
            Ok(true)
        }
    }
}

fn lyrics_client(settings: &Settings) -> anyhow::Result<LyricsClient> {
    LyricsClient::new(&settings.lyrics_base_url, settings.http_timeout())
        .with_context(|| format!("lyrics service url {}", settings.lyrics_base_url))
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}
