//! Lab host health checks: gather metrics through a shell, judge them against
//! a health policy, and report the results.

pub mod cli;
pub mod health;
pub mod metrics;
pub mod reporters;
pub mod runner;
pub mod shell;
pub mod utils;
