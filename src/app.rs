//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use crate::setup;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal voice translator: record speech, translate it, hear it back
#[derive(Parser)]
#[command(name = "ovt")]
#[command(version)]
#[command(about = "\n\n ┏┓┓┏╋\n ┗┛┗┛┗")]
#[command(
    long_about = "\n\n ┏┓┓┏╋\n ┗┛┗┛┗\n\nA terminal voice translator. Press Space to record, press it again to stop;\nthe recording is sent to the translation endpoint and the spoken translation\nis played back.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\nEXAMPLES:\n    # Run a translation session\n    $ ovt\n\n    # Run a session and copy each translation to the clipboard\n    $ ovt -c\n\n    # Re-translate the most recent recording into French\n    $ ovt retry --lang fr\n\n    # Hear the last spoken translation again\n    $ ovt replay\n\n    # Browse past translations\n    $ ovt history\n\n    # List supported target languages\n    $ ovt languages\n\n    # Edit configuration file\n    $ ovt config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/ovt/ovt.toml\n    Endpoint default:   http://localhost:5000/translate\n    Logs:               ~/.local/state/ovt/ovt.log.*"
)]
struct Cli {
    /// Copy translated text to the clipboard (record default command)
    #[arg(short, long, global = true)]
    copy: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive translation session (default)
    ///
    /// Space starts and stops recording, 'l' cycles the target language,
    /// 'r' replays the last spoken translation, Escape/q quits. Sending
    /// SIGUSR1 to the process also toggles the recording.
    #[command(visible_alias = "r")]
    Record {
        /// Copy translated text to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Re-translate a previous recording
    ///
    /// Sends an earlier recording to the endpoint again, optionally with a
    /// different target language. Useful when the endpoint was unreachable
    /// or you want the same words in another language.
    Retry {
        /// Recording index (1 = most recent, 2 = second most recent, etc.)
        #[arg(value_name = "N")]
        index: Option<usize>,

        /// Target language code (see 'ovt languages')
        #[arg(short, long, value_name = "CODE")]
        lang: Option<String>,

        /// Copy translated text to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Play back the spoken translation of a previous session
    ///
    /// Uses the system audio player (open on macOS, xdg-open/mpv/vlc/ffplay
    /// on Linux).
    #[command(visible_alias = "rp")]
    Replay {
        /// Recording index (1 = most recent, 2 = second most recent, etc.)
        #[arg(value_name = "N")]
        index: Option<usize>,
    },

    /// View and browse translation history
    ///
    /// Browse previous translations, select one to copy to clipboard.
    /// Use arrow keys to navigate, Enter to copy, Esc to exit.
    #[command(visible_alias = "h")]
    History,

    /// List supported target languages
    #[command(visible_alias = "ls")]
    Languages,

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio settings, the endpoint URL, and the target language.
    /// Uses $EDITOR environment variable or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in ovt.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   ovt completions bash > ovt.bash
    ///   ovt completions zsh > _ovt
    ///   ovt completions fish > ovt.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "ovt", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Languages) => {
            return commands::handle_languages();
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Write default config on first run, restamp it after upgrades
    setup::ensure_config().map_err(|e| {
        tracing::error!("Setup failed: {e}");
        anyhow!("Setup failed: {e}")
    })?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Record { .. }) => {
            // Default command is record; an explicit record flag wins over
            // the global one
            let copy = match cli.command {
                Some(Commands::Record { copy }) => copy || cli.copy,
                None => cli.copy,
                _ => unreachable!(),
            };
            commands::handle_record(copy).await?;
        }
        Some(Commands::Retry { index, lang, copy }) => {
            commands::handle_retry(index, lang, copy || cli.copy).await?;
        }
        Some(Commands::Replay { index }) => {
            commands::handle_replay(index).await?;
        }
        Some(Commands::History) => {
            commands::handle_history().await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. })
        | Some(Commands::Languages)
        | Some(Commands::ListDevices)
        | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
