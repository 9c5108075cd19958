//! pulp-provision - reset and seed a Pulp Python content server
//!
//! ## Commands
//!
//! - `pulp-provision reset` - Destroy everything, clear the store, provision every policy
//! - `pulp-provision smoke-test` - Stage a throwaway remote and repository and check them
//! - `pulp-provision teardown` - Destroy every distribution, publication, repository and remote
//! - `pulp-provision completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Reset the server using a config file
//! pulp-provision reset --config seed.yaml
//!
//! # Same, without echoing tool output
//! pulp-provision reset --config seed.yaml --quiet
//!
//! # Generate shell completions
//! pulp-provision completions bash > /etc/bash_completion.d/pulp-provision
//! ```

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
