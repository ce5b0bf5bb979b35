//! tigerload - load US Census TIGER/Line shapefiles through an external converter
//!
//! This library provides the converter runner, the TIGER/Line record models
//! and the supporting config/report types used by the `tigerload` binary.

pub mod config;
pub mod models;
pub mod reader;
pub mod report;
pub mod runner;

pub use config::Config;
pub use models::{Bg, Csa, Layer, Record, Zcta5};
pub use runner::{CommandRunner, RunOptions, RunOutcome, RunnerError};
