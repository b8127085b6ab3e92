//! Command handlers for the note commands

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::OnceLock;

use colored::Colorize;
use tokio::io::AsyncReadExt;

use crate::application::ports::{ConfigStore, RecognitionError};
use crate::application::{
    CaptureNoteError, CaptureNoteUseCase, DictateCallbacks, DictateInput, LoadOutcome, NoteStore,
    StopReason,
};
use crate::domain::capture::RecognitionSettings;
use crate::domain::config::AppConfig;
use crate::domain::notes::SearchQuery;
use crate::infrastructure::{
    create_notifier, CpalAudioSource, FileKeyValueStore, GeminiTranscriber, SegmentTiming,
    SegmentedRecognizer, XdgConfigStore,
};

use super::args::DictateOptions;
use super::presenter::Presenter;
use super::signals::wait_for_stop;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variables checked for the Gemini API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

type Recognizer = SegmentedRecognizer<CpalAudioSource, GeminiTranscriber>;

/// List notes, optionally filtered
pub async fn run_list(data_dir: &Path, search: Option<String>) -> ExitCode {
    let presenter = Presenter::new();
    let store = match open_store(data_dir, &presenter).await {
        Ok(store) => store,
        Err(code) => return code,
    };

    let query = SearchQuery::from(search);
    let matches = store.search(&query);

    if matches.is_empty() {
        if store.is_empty() {
            presenter.info("No notes yet. Add one with 'voice-notes add' or 'voice-notes dictate'");
        } else {
            presenter.info(&format!("No notes match \"{}\"", query.as_str()));
        }
    } else {
        presenter.note_list(matches);
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Print one note in full
pub async fn run_show(data_dir: &Path, reference: &str) -> ExitCode {
    let presenter = Presenter::new();
    let store = match open_store(data_dir, &presenter).await {
        Ok(store) => store,
        Err(code) => return code,
    };

    match store.resolve(reference) {
        Ok(note) => {
            presenter.note_detail(note);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Save typed text, from arguments or stdin
pub async fn run_add(data_dir: &Path, words: Vec<String>, notify: bool) -> ExitCode {
    let presenter = Presenter::new();

    let text = if words.is_empty() {
        match read_stdin().await {
            Ok(text) => text,
            Err(e) => {
                presenter.error(&format!("Failed to read stdin: {}", e));
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        words.join(" ")
    };

    let mut store = match open_store(data_dir, &presenter).await {
        Ok(store) => store,
        Err(code) => return code,
    };

    let use_case = CaptureNoteUseCase::new(text_only_recognizer(), create_notifier(notify));

    match use_case.save_text(&mut store, &text, notify).await {
        Ok(Some(note)) => {
            presenter.success(&format!("Note saved ({})", note.id().short()));
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(None) => {
            presenter.warn("Nothing to save: the note is empty");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Delete one note by id or unique prefix
pub async fn run_delete(data_dir: &Path, reference: &str) -> ExitCode {
    let presenter = Presenter::new();
    let mut store = match open_store(data_dir, &presenter).await {
        Ok(store) => store,
        Err(code) => return code,
    };

    let id = match store.resolve(reference) {
        Ok(note) => note.id().clone(),
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match store.remove(&id).await {
        Ok(Some(note)) => {
            presenter.success(&format!(
                "Deleted note {} ({})",
                note.id().short(),
                note.preview(40)
            ));
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(None) => {
            presenter.error(&format!("Note not found: {}", reference));
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Dictate a note with a live transcript
pub async fn run_dictate(data_dir: &Path, options: DictateOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut store = match open_store(data_dir, &presenter).await {
        Ok(store) => store,
        Err(code) => return code,
    };

    let recognizer = SegmentedRecognizer::new(
        CpalAudioSource::new(),
        options.api_key.clone().map(GeminiTranscriber::new),
        SegmentTiming {
            interim_interval: options.interim_interval,
            segment_length: options.segment_length,
        },
    );
    let use_case = CaptureNoteUseCase::new(recognizer, create_notifier(options.notify));

    presenter.start_spinner("Starting microphone...");
    let callbacks = live_callbacks(&presenter, &options);

    let input = DictateInput {
        settings: RecognitionSettings::dictation(options.language.clone()),
        max_duration: Some(options.max_duration),
        save: options.save,
        enable_notify: options.notify,
    };

    let trigger = OnceLock::new();
    let stop = async {
        let _ = trigger.set(wait_for_stop().await);
    };

    let output = match use_case.dictate(&mut store, input, callbacks, stop).await {
        Ok(output) => output,
        Err(CaptureNoteError::Unavailable(reason)) => {
            presenter.stop_spinner();
            presenter.warn(&reason);
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            presenter.spinner_fail("Dictation failed");
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match output.stop_reason {
        StopReason::Failed => presenter.spinner_fail("Dictation interrupted"),
        StopReason::MaxDuration => presenter.spinner_success(&format!(
            "Dictation stopped after {}",
            options.max_duration
        )),
        StopReason::Requested => match trigger.get() {
            Some(trigger) => {
                presenter.spinner_success(&format!("Dictation stopped ({})", trigger))
            }
            None => presenter.spinner_success("Dictation stopped"),
        },
        StopReason::SessionEnded => presenter.spinner_success("Dictation stopped"),
    }

    if output.text.is_empty() {
        presenter.warn("Nothing was transcribed; no note saved");
        return ExitCode::from(if output.error.is_some() {
            EXIT_ERROR
        } else {
            EXIT_SUCCESS
        });
    }

    presenter.output(&output.text);

    if let Some(e) = output.save_error {
        presenter.error(&format!("Could not save the note: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    match output.note {
        Some(note) => presenter.success(&format!("Note saved ({})", note.id().short())),
        None => presenter.info("Transcript not saved (--no-save)"),
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Spinner updates for the live transcript, warnings for recognition errors
fn live_callbacks(presenter: &Presenter, options: &DictateOptions) -> DictateCallbacks {
    let Some(spinner) = presenter.spinner_handle() else {
        return DictateCallbacks::default();
    };

    let listening = spinner.clone();
    let language = options.language.clone();
    let transcript = spinner.clone();
    let errors = spinner;

    DictateCallbacks {
        on_listening: Some(Box::new(move || {
            listening.set_message(format!(
                "{} [{}]",
                Presenter::format_live_transcript(""),
                language
            ));
        })),
        on_transcript: Some(Box::new(move |text: &str| {
            transcript.set_message(Presenter::format_live_transcript(text));
        })),
        on_error: Some(Box::new(move |e: &RecognitionError| {
            errors.println(format!("{} {}", "⚠".yellow(), e));
        })),
        on_stopped: None,
    }
}

/// Recognizer for commands that only save typed text
fn text_only_recognizer() -> Recognizer {
    SegmentedRecognizer::new(CpalAudioSource::new(), None, SegmentTiming::default())
}

/// Load the note store, warning when the stored data was unreadable
async fn open_store(
    data_dir: &Path,
    presenter: &Presenter,
) -> Result<NoteStore<FileKeyValueStore>, ExitCode> {
    let storage = FileKeyValueStore::new(data_dir);

    match NoteStore::load(storage).await {
        Ok((store, LoadOutcome::Corrupt { reason, backup_key })) => {
            presenter.warn(&format!(
                "Stored notes could not be read ({}); starting empty. The old data was kept in {}",
                reason,
                backup_path(&store, &backup_key, data_dir).display()
            ));
            Ok(store)
        }
        Ok((
            store,
            LoadOutcome::Partial {
                skipped,
                backup_key,
                ..
            },
        )) => {
            presenter.warn(&format!(
                "Skipped {} unreadable stored note(s). The old data was kept in {}",
                skipped,
                backup_path(&store, &backup_key, data_dir).display()
            ));
            Ok(store)
        }
        Ok((store, _)) => Ok(store),
        Err(e) => {
            presenter.error(&format!("Could not open note storage: {}", e));
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

fn backup_path(
    store: &NoteStore<FileKeyValueStore>,
    backup_key: &str,
    data_dir: &Path,
) -> PathBuf {
    store
        .storage()
        .path_for(backup_key)
        .unwrap_or_else(|_| data_dir.to_path_buf())
}

/// Read all of stdin, dropping one trailing line break
async fn read_stdin() -> std::io::Result<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;

    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}

/// API key from the first non-empty environment variable
pub fn env_api_key() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|key| !key.trim().is_empty())
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    let env_config = AppConfig {
        api_key: env_api_key(),
        ..Default::default()
    };

    // defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
