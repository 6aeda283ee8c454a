//! Test support utilities shared by the werewolf crates.
//!
//! Currently this is the unified logging bootstrap used by unit and
//! integration test binaries.

pub mod logging;
