use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use veil_core::VERSION;

/// Veil - transparent at-rest encryption for private notes
#[derive(Parser)]
#[command(name = "veil")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the vault directory
    #[arg(long, global = true, env = "VEIL_VAULT")]
    pub vault: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Vault directory (created if missing)
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Marker that flags a note as private
    #[arg(long)]
    pub marker: Option<String>,

    /// Note extension to govern (repeatable)
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `status` command
#[derive(Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `cat` command
#[derive(Args)]
pub struct CatArgs {
    /// Vault-relative note path
    #[arg(value_name = "PATH")]
    pub path: String,
}

/// Arguments for the `write` command
#[derive(Args)]
pub struct WriteArgs {
    /// Vault-relative note path
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Note body (read from stdin if omitted)
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file pointing at a vault
    Init(InitArgs),

    /// Show how many notes are encrypted or exposed
    Status(StatusArgs),

    /// Verify the password and decrypt private notes in place
    Unlock,

    /// Encrypt every private note
    Lock,

    /// Re-encrypt private notes under a new password
    ChangePassword,

    /// Move notes left under an older password onto the current one
    Recover,

    /// Print a note, decrypted if private
    Cat(CatArgs),

    /// Write a note, encrypting it if it carries the marker
    Write(WriteArgs),

    /// Unlock and accept commands on stdin until quit, then lock
    Session,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["veil", "-vv", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Status(StatusArgs { json: false })));
    }

    #[test]
    fn test_vault_flag_is_global() {
        let cli = Cli::try_parse_from(["veil", "cat", "a.md", "--vault", "/tmp/v"]).unwrap();
        assert_eq!(cli.vault.as_deref(), Some("/tmp/v"));
    }
}
