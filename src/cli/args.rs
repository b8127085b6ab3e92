//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::capture::LanguageTag;
use crate::domain::recording::Duration;

/// VoiceNotes - capture, dictate and search short notes
#[derive(Parser, Debug)]
#[command(name = "voice-notes")]
#[command(version)]
#[command(about = "Capture notes by typing or dictation, then list and search them")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding the note data
    #[arg(long, global = true, value_name = "DIR", env = "VOICE_NOTES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes, newest first
    #[command(visible_alias = "ls")]
    List {
        /// Only show notes containing this text (case-insensitive)
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,
    },
    /// Show notes containing the given text (case-insensitive)
    Search {
        /// Text to look for
        query: String,
    },
    /// Print one note in full
    Show {
        /// Note id or a unique prefix of it
        id: String,
    },
    /// Save a typed note (reads stdin when no text is given)
    Add {
        /// Note text
        text: Vec<String>,
    },
    /// Dictate a note from the microphone
    Dictate {
        /// Stop automatically after this long (e.g., 30s, 2m)
        #[arg(short = 'd', long, value_name = "TIME")]
        max_duration: Option<String>,

        /// Spoken language as a BCP 47 tag (e.g., pt-BR, en-US)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Print the transcript without saving it
        #[arg(long)]
        no_save: bool,

        /// Show desktop notifications
        #[arg(short, long)]
        notify: bool,
    },
    /// Delete a note
    #[command(visible_alias = "rm")]
    Delete {
        /// Note id or a unique prefix of it
        id: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed dictate options
#[derive(Debug, Clone)]
pub struct DictateOptions {
    pub api_key: Option<String>,
    pub language: LanguageTag,
    pub max_duration: Duration,
    pub interim_interval: Duration,
    pub segment_length: Duration,
    pub save: bool,
    pub notify: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "language",
    "data_dir",
    "max_duration",
    "interim_interval",
    "segment_length",
    "notify",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_list() {
        let cli = Cli::parse_from(["voice-notes", "list"]);
        assert!(matches!(cli.command, Commands::List { search: None }));
    }

    #[test]
    fn cli_parses_list_search() {
        let cli = Cli::parse_from(["voice-notes", "ls", "-s", "milk"]);
        match cli.command {
            Commands::List { search } => assert_eq!(search, Some("milk".to_string())),
            other => panic!("Expected List, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_add_words() {
        let cli = Cli::parse_from(["voice-notes", "add", "buy", "milk"]);
        match cli.command {
            Commands::Add { text } => assert_eq!(text, vec!["buy", "milk"]),
            other => panic!("Expected Add, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_dictate_options() {
        let cli = Cli::parse_from([
            "voice-notes",
            "dictate",
            "-d",
            "30s",
            "--language",
            "en-US",
            "--no-save",
        ]);
        match cli.command {
            Commands::Dictate {
                max_duration,
                language,
                no_save,
                notify,
            } => {
                assert_eq!(max_duration, Some("30s".to_string()));
                assert_eq!(language, Some("en-US".to_string()));
                assert!(no_save);
                assert!(!notify);
            }
            other => panic!("Expected Dictate, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_global_data_dir() {
        let cli = Cli::parse_from(["voice-notes", "delete", "abc", "--data-dir", "/tmp/n"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/n")));
        assert!(matches!(cli.command, Commands::Delete { .. }));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["voice-notes", "config", "set", "language", "en-US"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "language");
            assert_eq!(value, "en-US");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["voice-notes"]).is_err());
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("api_key"));
        assert!(is_valid_config_key("segment_length"));
        assert!(!is_valid_config_key("duration"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
