//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Archived message reconstruction: rebuild a prefix-code tree from its shape code and decode the message
#[derive(Parser, Debug)]
#[command(name = "msgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode an archive: code table, message and statistics
    Decode {
        /// Archive file (prompted for if omitted)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Drop bits ending mid-path instead of failing
        #[arg(long)]
        lenient: bool,
        /// Skip the code table
        #[arg(long)]
        no_codes: bool,
    },

    /// Print the code table of an archive's tree
    Codes {
        /// Archive file (prompted for if omitted)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Show the rebuilt tree
    Tree {
        /// Archive file (prompted for if omitted)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Directory whose .msgtree.toml is layered in
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show config paths
    Path,

    /// Create global config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_decode_flags() {
        let cli = Cli::parse_from(["msgtree", "-vv", "decode", "msg.arch", "--lenient"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Decode {
                file,
                lenient,
                no_codes,
            }) => {
                assert_eq!(file, Some(PathBuf::from("msg.arch")));
                assert!(lenient);
                assert!(!no_codes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["msgtree"]);
        assert!(cli.command.is_none());
    }
}
