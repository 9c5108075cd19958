//! CLI for pulp-provision
//!
//! - `reset`: destroy everything, clear the store, provision every policy
//! - `smoke-test`: stage a throwaway remote and repository and check them
//! - `teardown`: destroy everything
//! - `completions`: generate shell completions

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Generator, Shell};
use pulp_provision::{CommandRecordStore, Config, ShellRunner, Workflow, init_logging, set_verbose};
use std::fs::File;
use std::path::{Path, PathBuf};

const BIN_NAME: &str = "pulp-provision";

/// CLI arguments for pulp-provision
#[derive(Parser, Debug)]
#[command(name = "pulp-provision")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file (defaults are used when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Do not echo captured command output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Destroy all resources, clear the store, then provision every configured policy
    Reset,

    /// Stage a throwaway remote and repository and check them
    SmokeTest,

    /// Destroy all distributions, publications, repositories and remotes
    Teardown,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file, or a directory to write the shell's conventional
        /// file name into (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

impl From<ShellArg> for Shell {
    fn from(shell: ShellArg) -> Self {
        match shell {
            ShellArg::Bash => Shell::Bash,
            ShellArg::Zsh => Shell::Zsh,
            ShellArg::Fish => Shell::Fish,
            ShellArg::PowerShell => Shell::PowerShell,
        }
    }
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Writes completions for `shell` and returns the file written, if any
///
/// A directory `output` receives the shell's conventional file name
/// (`pulp-provision.bash`, `_pulp-provision`, ...).
fn write_completions(shell: Shell, output: Option<&Path>) -> Result<Option<PathBuf>> {
    let mut cmd = build_cli();
    let Some(output) = output else {
        clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
        return Ok(None);
    };

    let path = if output.is_dir() {
        output.join(shell.file_name(BIN_NAME))
    } else {
        output.to_path_buf()
    };
    let mut file = File::create(&path)
        .with_context(|| format!("Failed to write completions to: {}", path.display()))?;
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut file);
    Ok(Some(path))
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    if let Command::Completions { shell, output } = args.command {
        if let Some(path) = write_completions(shell.into(), output.as_deref())? {
            eprintln!("Completions written to {}", path.display());
        }
        return Ok(());
    }

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(args.log_level.as_deref().unwrap_or(&config.log_level));
    set_verbose(config.verbose && !args.quiet);

    let runner = ShellRunner::new(config.shell_config());
    let workflow = Workflow::new(&runner, &config);

    match args.command {
        Command::Reset => {
            let store = CommandRecordStore::new(&runner, &config.store);
            let report = workflow
                .reset_and_provision(&store)
                .context("Reset and provision failed")?;
            println!("{}", report.cleared);
            for (policy, name, href) in report.distributions() {
                println!("{policy}: distribution {name} serving {href}");
            }
        }
        Command::SmokeTest => {
            workflow.smoke_test().context("Smoke test failed")?;
            println!("Smoke test passed: {}", config.smoke_test.name);
        }
        Command::Teardown => {
            let report = workflow
                .teardown()
                .destroy_existing()
                .context("Teardown failed")?;
            println!("Destroyed {} resources", report.destroyed_count());
            if !report.orphans.trim().is_empty() {
                println!("{}", report.orphans.trim());
            }
        }
        Command::Completions { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "pulp-provision",
            "reset",
            "--config",
            "seed.yaml",
            "-q",
        ])
        .unwrap();

        assert!(matches!(args.command, Command::Reset));
        assert_eq!(args.config, Some(PathBuf::from("seed.yaml")));
        assert!(args.quiet);
    }

    #[test]
    fn test_completions_into_directory_use_shell_file_name() {
        let dir = tempfile::tempdir().unwrap();

        let bash = write_completions(Shell::Bash, Some(dir.path())).unwrap().unwrap();
        let zsh = write_completions(Shell::Zsh, Some(dir.path())).unwrap().unwrap();

        assert_eq!(bash, dir.path().join("pulp-provision.bash"));
        assert_eq!(zsh, dir.path().join("_pulp-provision"));
        let script = std::fs::read_to_string(&bash).unwrap();
        assert!(script.contains("smoke-test"));
        assert!(script.contains("teardown"));
    }

    #[test]
    fn test_completions_to_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("pp.fish");

        let written = write_completions(Shell::Fish, Some(&target)).unwrap();

        assert_eq!(written, Some(target.clone()));
        assert!(std::fs::read_to_string(&target).unwrap().contains("pulp-provision"));
    }

    #[test]
    fn test_shell_arg_maps_to_generator() {
        assert_eq!(Shell::from(ShellArg::PowerShell), Shell::PowerShell);
        assert_eq!(Shell::from(ShellArg::Bash), Shell::Bash);
    }

    #[test]
    fn test_smoke_test_subcommand_name() {
        let args = Args::try_parse_from(["pulp-provision", "smoke-test"]).unwrap();
        assert!(matches!(args.command, Command::SmokeTest));
    }
}
