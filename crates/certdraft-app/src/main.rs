//! Main application entry point (native).

use std::path::PathBuf;
use std::process::ExitCode;

use certdraft_app::{App, AppConfig, AppError, UiAction};
use certdraft_core::format::Format;
use certdraft_render::ExportFormat;
use clap::Parser;

/// Compose a certificate template from CSV sample data and export it.
#[derive(Debug, Parser)]
#[command(name = "certdraft", version, about)]
struct Cli {
    /// CSV file; the header and first data row are used.
    #[arg(long, conflicts_with = "demo")]
    csv: Option<PathBuf>,

    /// Use the built-in demo row instead of a CSV.
    #[arg(long)]
    demo: bool,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of UI actions to run after the flags below.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Canvas format: 1x1, 4x3 or 16x9.
    #[arg(long)]
    format: Option<Format>,

    /// Add a text layer for a CSV field (repeatable).
    #[arg(long = "add", value_name = "FIELD")]
    add: Vec<String>,

    /// Add a text box (repeatable). Empty text gives the placeholder.
    #[arg(long = "textbox", value_name = "TEXT")]
    textbox: Vec<String>,

    /// Background image file.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Export the result to this path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Export format: jpeg or png.
    #[arg(long = "export-format")]
    export_format: Option<ExportFormat>,

    /// Export multiplier (device pixel ratio).
    #[arg(long)]
    scale: Option<f64>,

    /// Write the last preview frame (with selection outline) as PNG.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Print fields and layers when done.
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig, AppError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(format) = self.format {
            config.editor.format = format;
        }
        if let Some(export_format) = self.export_format {
            config.export_format = export_format;
        }
        if let Some(scale) = self.scale {
            config.device_pixel_ratio = scale;
        }
        if let Some(out) = &self.out {
            config.output = Some(out.clone());
        }
        Ok(config)
    }

    fn actions(&self) -> Result<Vec<UiAction>, AppError> {
        let mut actions = Vec::new();
        if let Some(path) = &self.csv {
            actions.push(UiAction::LoadCsv { path: path.clone() });
        } else if self.demo {
            actions.push(UiAction::UseDemoData);
        }
        actions.extend(self.add.iter().map(|field| UiAction::AddField {
            field: field.clone(),
        }));
        actions.extend(self.textbox.iter().map(|text| UiAction::AddTextbox {
            text: text.clone(),
        }));
        if let Some(path) = &self.background {
            actions.push(UiAction::UploadBackground { path: path.clone() });
        }
        if let Some(path) = &self.script {
            let json = std::fs::read_to_string(path)?;
            actions.extend(UiAction::script_from_json(&json)?);
        }
        if self.out.is_some() {
            actions.push(UiAction::Download { path: None });
        }
        Ok(actions)
    }
}

fn run(cli: &Cli) -> Result<usize, AppError> {
    let mut app = App::new(cli.app_config()?);
    app.run(cli.actions()?);
    // Late backgrounds land in the preview; their failures count too.
    app.wait_backgrounds()?;

    if let Some(path) = &cli.preview {
        app.save_preview(path)?;
        log::info!("Preview written to {:?}", path);
    }
    if cli.list {
        print!("{}", app.ui_state().describe());
    }
    Ok(app.failures())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting CertDraft");

    let cli = Cli::parse();
    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            log::error!("{} action(s) failed", failures);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("certdraft: {e}");
            ExitCode::FAILURE
        }
    }
}
