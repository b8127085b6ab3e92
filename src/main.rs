//! VoiceNotes CLI entry point

use std::process::ExitCode;

use clap::Parser;

use voice_notes::cli::{
    app::{load_merged_config, run_add, run_delete, run_dictate, run_list, run_show},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    DictateOptions, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use voice_notes::domain::capture::LanguageTag;
use voice_notes::domain::config::AppConfig;
use voice_notes::domain::recording::Duration;
use voice_notes::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    if let Commands::Config { action } = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let mut cli_config = AppConfig {
        data_dir: cli.data_dir.clone(),
        ..Default::default()
    };
    if let Commands::Dictate {
        ref max_duration,
        ref language,
        notify,
        ..
    } = cli.command
    {
        cli_config.max_duration = max_duration.clone();
        cli_config.language = language.clone();
        cli_config.notify = notify.then_some(true);
    }

    let config = load_merged_config(cli_config).await;
    let data_dir = config.data_dir_or_default();

    match cli.command {
        Commands::List { search } => run_list(&data_dir, search).await,
        Commands::Search { query } => run_list(&data_dir, Some(query)).await,
        Commands::Show { id } => run_show(&data_dir, &id).await,
        Commands::Add { text } => run_add(&data_dir, text, config.notify_or_default()).await,
        Commands::Delete { id } => run_delete(&data_dir, &id).await,
        Commands::Dictate { no_save, .. } => {
            let max_duration = match config.max_duration.as_deref().map(str::parse::<Duration>) {
                Some(Ok(d)) => d,
                Some(Err(e)) => {
                    presenter.error(&format!("Invalid max-duration: {}", e));
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
                None => Duration::default_max_duration(),
            };

            let language = match config.language.as_deref().map(str::parse::<LanguageTag>) {
                Some(Ok(tag)) => tag,
                Some(Err(e)) => {
                    presenter.error(&e.to_string());
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
                None => LanguageTag::default(),
            };

            let options = DictateOptions {
                api_key: config.api_key.clone(),
                language,
                max_duration,
                interim_interval: config.interim_interval_or_default(),
                segment_length: config.segment_length_or_default(),
                save: !no_save,
                notify: config.notify_or_default(),
            };

            run_dictate(&data_dir, options).await
        }
        Commands::Config { .. } => unreachable!("handled above"),
    }
}
