//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::host::terminal::default_collection;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Voice recorder for flashcard collections
#[derive(Parser)]
#[command(name = "flashrec")]
#[command(version)]
#[command(about = "Record voice clips into a flashcard collection's media folder")]
#[command(long_about = "Record voice clips into a flashcard collection's media folder.\n\nEvery recording is saved as voice_<YYYYMMDD_HHMMSS>.wav and amplified by the\nconfigured gain once it is stopped.\n\nDEFAULT COMMAND:\n    If no command is specified, 'session' is used by default.\n\nEXAMPLES:\n    # Start a recording session on the default collection\n    $ flashrec\n\n    # Use another profile\n    $ flashrec --collection ~/.local/share/Anki2/Spanish\n\n    # Boost an existing clip\n    $ flashrec amplify voice_20240102_030405.wav --gain 2")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/flashrec/flashrec.toml\n    Logs:               ~/.local/state/flashrec/flashrec.log.*"
)]
struct Cli {
    /// Collection folder whose media folder receives recordings
    #[arg(long, value_name = "DIR", global = true)]
    collection: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive recording session (default)
    ///
    /// Ctrl+R toggles recording, Ctrl+Shift+R plays the last recording,
    /// m or F10 opens the menu, Escape/q quits.
    #[command(visible_alias = "s")]
    Session,

    /// Apply gain to an existing WAV file in place
    ///
    /// Uses the configured gain unless --gain is given. The gain is clamped
    /// to 0.1-5.0 and samples saturate at the limits of their width.
    #[command(visible_alias = "a")]
    Amplify {
        /// Path to the WAV file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Gain factor
        #[arg(short, long, value_name = "GAIN")]
        gain: Option<f64>,
    },

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the input device in flashrec.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Open configuration file in your preferred editor
    ///
    /// Edit the save folder, gain, shortcuts and input device.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   flashrec completions bash > flashrec.bash
    ///   flashrec completions zsh > _flashrec
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "flashrec", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Session) => {
            let collection = cli.collection.unwrap_or_else(default_collection);
            commands::handle_session(collection)?;
        }
        Some(Commands::Amplify { file, gain }) => {
            commands::handle_amplify(file, gain)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_session() {
        let cli = Cli::try_parse_from(["flashrec", "--collection", "/tmp/profile"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.collection, Some(PathBuf::from("/tmp/profile")));
    }

    #[test]
    fn test_amplify_arguments() {
        let cli = Cli::try_parse_from(["flashrec", "amplify", "clip.wav", "--gain", "2.5"]).unwrap();
        match cli.command {
            Some(Commands::Amplify { file, gain }) => {
                assert_eq!(file, PathBuf::from("clip.wav"));
                assert_eq!(gain, Some(2.5));
            }
            _ => panic!("expected amplify"),
        }
    }
}
