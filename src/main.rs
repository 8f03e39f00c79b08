use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use scriptify::app::{TranscribeSettings, run_transcription};
use scriptify::cli::{Cli, Commands, ModelsAction};
use scriptify::config::Config;
use scriptify::models::catalog::list_models;
use scriptify::models::download::{download_model, format_model_info};
use scriptify::output::emit_result;
use scriptify::pipeline::{
    BarProgress, LogProgress, ProgressObserver, SilentProgress, TranscriptionResult, check_input,
    response_language,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Exit code when the input file precondition fails.
const EXIT_PRECONDITION: i32 = 1;

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    scriptify::logging::init(cli.verbose, cli.quiet);

    match cli.command.take() {
        None => {
            let code = transcribe_command(cli).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Some(Commands::Models { action }) => {
            handle_models_command(action, cli.config.as_deref()).await?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "scriptify", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Transcribe `--audio-path` and print the result line. Returns the exit code.
async fn transcribe_command(cli: Cli) -> Result<i32> {
    let audio_path = cli.audio_path.clone().unwrap_or_default();
    let settings = resolve_settings(&cli, audio_path.clone());
    // An unusable config leaves only the flag to describe the language
    let hint = match &settings {
        Ok(settings) => settings.request.language.clone(),
        Err(_) => cli.language.clone().unwrap_or_default(),
    };

    if let Err(e) = check_input(&audio_path) {
        tracing::error!("{e}");
        emit(&TranscriptionResult::failure(e.to_string(), response_language(&hint)))?;
        return Ok(EXIT_PRECONDITION);
    }

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{e}");
            emit(&TranscriptionResult::failure(e.to_string(), response_language(&hint)))?;
            return Ok(0);
        }
    };
    tracing::debug!(version = %scriptify::version_string(), ?settings, "resolved settings");

    let progress = progress_observer(cli.quiet);
    let handle = tokio::runtime::Handle::current();
    let language = settings.request.language.clone();

    let result = tokio::task::spawn_blocking(move || {
        run_transcription(&settings, progress.as_ref(), &handle)
    })
    .await
    .unwrap_or_else(|e| {
        tracing::error!("transcription task failed: {e}");
        TranscriptionResult::failure(
            format!("Transcription task failed: {e}"),
            response_language(&language),
        )
    });

    emit(&result)?;
    Ok(0)
}

fn resolve_settings(cli: &Cli, audio_path: PathBuf) -> scriptify::Result<TranscribeSettings> {
    let mut config = Config::resolve(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let show_bars = !cli.quiet && std::io::stderr().is_terminal();
    Ok(
        TranscribeSettings::from_config(audio_path, &config, cli.model_path.clone())
            .with_download_progress(show_bars),
    )
}

/// Bars on a terminal, log lines otherwise, nothing in quiet mode.
fn progress_observer(quiet: bool) -> Box<dyn ProgressObserver> {
    if quiet {
        Box::new(SilentProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress)
    }
}

fn emit(result: &TranscriptionResult) -> Result<()> {
    emit_result(std::io::stdout().lock(), result)?;
    Ok(())
}

async fn handle_models_command(action: ModelsAction, config_path: Option<&Path>) -> Result<()> {
    let config = Config::resolve(config_path)?;
    let models_dir = config.models_dir();

    match action {
        ModelsAction::List => {
            println!("Available models ({}):", models_dir.display().dimmed());
            for model in list_models() {
                let line = format_model_info(&models_dir, model);
                if model.size == config.transcription.model_size {
                    println!("  {} {}", "●".green(), line);
                } else {
                    println!("  ○ {}", line);
                }
            }
        }
        ModelsAction::Install { size } => {
            let show_progress = std::io::stderr().is_terminal();
            match download_model(&models_dir, size, show_progress).await {
                Ok(path) => {
                    println!("Model '{}' installed successfully", size.green());
                    println!("Location: {}", path.display());
                }
                Err(e) => {
                    eprintln!("{}", format!("Error: {e}").red());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
