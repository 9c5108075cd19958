//! Teardown and provisioning workflows

mod driver;
mod teardown;

pub use driver::{ProvisionReport, Workflow};
pub use teardown::{KindReport, Teardown, TeardownReport};
