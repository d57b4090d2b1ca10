// crates/lumina-app/src/main.rs
//
// `lumina`: headless driver for the editing engine.
//
//   lumina --project edit.json --import a.mp4 --import song.mp3 \
//          --actions ai.json --export mp4 --save edit.json
//
// Steps run in a fixed order: load → import → actions → frame/export → save.
// A JSON summary goes to stdout; logs go to stderr and <temp>/lumina.log.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use lumina_core::EditorConfig;
use lumina_media::MediaWorker;

use lumina_app::helpers;
use lumina_app::{effect_catalog, LuminaApp};

#[derive(Parser, Debug)]
#[command(name = "lumina")]
#[command(version)]
#[command(about = "Timeline editing engine: apply edit actions, resolve frames, export")]
struct Cli {
    /// Project JSON to start from (timeline + playback state)
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Media files to probe and append to the timeline
    #[arg(short, long = "import")]
    imports: Vec<PathBuf>,

    /// Edit-action batch: `{"actions": [...]}` or a bare array
    #[arg(short, long)]
    actions: Option<PathBuf>,

    /// Editor config JSON; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the frame descriptor at this timeline time (seconds)
    #[arg(long)]
    frame_at: Option<f64>,

    /// Render the timeline to this format (e.g. mp4, jsonl)
    #[arg(short, long)]
    export: Option<String>,

    /// Output name (without extension) for --export
    #[arg(long, default_value = "export")]
    name: String,

    /// Directory exports are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Write the resulting project here
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Seconds to wait for media probes
    #[arg(long, default_value = "30")]
    probe_timeout: u64,

    /// Print the transition and filter names actions accept, then exit
    #[arg(long)]
    list_effects: bool,
}

fn main() -> Result<()> {
    helpers::log::init();
    let cli = Cli::parse();

    if cli.list_effects {
        println!("{}", serde_json::to_string_pretty(&effect_catalog())?);
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    let mut app = LuminaApp::new(config, MediaWorker::new(), cli.out_dir.clone());

    if let Some(path) = &cli.project {
        app.load_project(path)?;
    }

    if !cli.imports.is_empty() {
        app.import(&cli.imports);
        let added = app.wait_for_imports(Duration::from_secs(cli.probe_timeout));
        info!("[import] {} of {} file(s) added", added.len(), cli.imports.len());
    }

    if let Some(path) = &cli.actions {
        app.process_action_file(path)?;
    }
    app.log_state();

    if let Some(t) = cli.frame_at {
        let frame = app.frame_at(t);
        println!("{}", serde_json::to_string_pretty(&frame)?);
    }

    let report = match &cli.export {
        Some(format) => Some(app.run_export(format, &cli.name)?),
        None => None,
    };

    if let Some(path) = &cli.save {
        app.save_project(path)?;
    }

    println!("{}", serde_json::to_string_pretty(&app.summary(report.as_ref()))?);
    app.shutdown();
    Ok(())
}
