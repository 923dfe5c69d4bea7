#![doc = include_str!("../README.md")]

// Re-export std common modules
pub mod prelude {
    pub use std::env;
    pub use std::error::Error;
    pub use std::fs;
    pub use std::io;
    pub use std::path::{Path, PathBuf};
    pub use std::process::Command;
    pub use std::process::Stdio;
    pub use std::sync::mpsc;
    pub use log::{debug, error, info, warn};
}

pub mod e_cli;
pub use e_cli::Cli;
pub mod e_command_builder;
pub use e_command_builder::{SwiftCommand, SwiftCommandBuilder, TargetTriple};
pub mod e_findmain;
pub mod e_manifest;
pub use e_manifest::SwiftPackage;
pub mod e_parser;
pub use e_parser::parse_compilation_errors;
pub mod e_reports;
pub mod e_runner;
pub use e_runner::{ProcessRunner, RunnerError};
pub mod e_swift;
pub use e_swift::{BuildError, ProductRole, Swift};
pub mod e_types;
pub use e_types::*;
