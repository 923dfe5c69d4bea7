use crate::e_command_builder::{SwiftCommand, SwiftCommandBuilder, TargetTriple};
use crate::e_manifest::SwiftPackage;
use crate::e_parser::parse_compilation_errors;
use crate::e_runner::{marker_env, ProcessRunner, RunnerError};
use crate::e_types::{BuildOutcome, DiagnosticsResult, Preview};
use crate::prelude::*;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::fmt;
use std::thread::{self, JoinHandle};

/// Message used when a failed build printed something the parser could not use.
pub const UNPARSEABLE_ERRORS: &str = "Unable to parse errors";

/// Everything that can go wrong while talking to the toolchain.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The compiler rejected the sources; one entry per file.
    #[error("{}", describe_diagnostics(.0))]
    Diagnostics(DiagnosticsResult),
    /// Failure text that is not compiler diagnostics, already trimmed.
    #[error("{0}")]
    RawText(String),
    /// Non-zero exit with nothing on stdout or stderr.
    #[error("{}", describe_exit(.0))]
    ProcessFailure(Option<i32>),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("unable to decode toolchain output: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    ProductNotFound(String),
}

fn describe_diagnostics(errors: &DiagnosticsResult) -> String {
    if errors.len() == 1 {
        "found 1 error".to_string()
    } else {
        format!("found {} errors", errors.len())
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("Build failed with exit code {}", code),
        None => "Build failed: toolchain terminated by signal".to_string(),
    }
}

/// Which executable product a lookup is for; only changes the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductRole {
    App,
    ServiceWorker,
}

impl fmt::Display for ProductRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductRole::App => write!(f, "app"),
            ProductRole::ServiceWorker => write!(f, "service worker"),
        }
    }
}

/// Front door to the Swift toolchain for one project directory.
///
/// Every call spawns a fresh process; the only state kept between calls is
/// the package manifest, which is dumped once and then reused.
#[derive(Debug, Clone)]
pub struct Swift {
    launch_path: PathBuf,
    working_directory: PathBuf,
    package: OnceCell<SwiftPackage>,
}

impl Swift {
    pub fn new(launch_path: impl Into<PathBuf>, working_directory: impl Into<PathBuf>) -> Self {
        Swift {
            launch_path: launch_path.into(),
            working_directory: working_directory.into(),
            package: OnceCell::new(),
        }
    }

    /// Uses the `swift` found on `PATH`.
    pub fn locate(working_directory: impl Into<PathBuf>) -> Result<Self, which::Error> {
        let launch_path = which::which("swift")?;
        Ok(Swift::new(launch_path, working_directory))
    }

    pub fn launch_path(&self) -> &Path {
        &self.launch_path
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn version(&self) -> Result<String, BuildError> {
        self.execute(&SwiftCommand::Version)
    }

    /// Builds `product_name`. On failure the compiler output is parsed into
    /// [`BuildError::Diagnostics`] when possible.
    pub fn build(
        &self,
        product_name: &str,
        release: bool,
        triple: TargetTriple,
    ) -> Result<String, BuildError> {
        self.build_with_args(product_name, release, triple, &[])
    }

    /// [`Swift::build`] with extra toolchain flags appended to the command line.
    pub fn build_with_args(
        &self,
        product_name: &str,
        release: bool,
        triple: TargetTriple,
        extra_args: &[String],
    ) -> Result<String, BuildError> {
        let command = SwiftCommand::Build {
            release,
            product_name: product_name.to_string(),
            triple,
        };
        self.execute_with_args(&command, extra_args)
    }

    /// [`Swift::build`] on a background thread. There is no way to cancel it
    /// from here; kill the toolchain process out of band if you must.
    pub fn spawn_build(
        &self,
        product_name: &str,
        release: bool,
        triple: TargetTriple,
    ) -> JoinHandle<Result<String, BuildError>> {
        let swift = self.clone();
        let product_name = product_name.to_string();
        thread::spawn(move || swift.build(&product_name, release, triple))
    }

    /// Runs the preview executable for `module_name` and decodes the previews it prints.
    pub fn previews(
        &self,
        module_name: &str,
        preview_names: &[String],
    ) -> Result<Vec<Preview>, BuildError> {
        #[derive(Deserialize)]
        struct PreviewList {
            previews: Vec<Preview>,
        }

        let output = self.execute(&SwiftCommand::Previews {
            module_name: module_name.to_string(),
            preview_names: preview_names.to_vec(),
        })?;
        let list: PreviewList = serde_json::from_str(&output)?;
        Ok(list.previews)
    }

    /// The package manifest, dumped on first use.
    pub fn dump_package(&self) -> Result<&SwiftPackage, BuildError> {
        self.package.get_or_try_init(|| {
            let dump = self.execute(&SwiftCommand::Dump)?;
            let package = SwiftPackage::from_json(&dump)?;
            debug!(
                "dumped package with {} products",
                package.products.as_ref().map_or(0, Vec::len)
            );
            Ok(package)
        })
    }

    pub fn check_executable_product(
        &self,
        product_name: &str,
        role: ProductRole,
    ) -> Result<(), BuildError> {
        if self.dump_package()?.has_executable_product(product_name) {
            Ok(())
        } else {
            Err(BuildError::ProductNotFound(format!(
                "Unable to find {} executable product with name `{}` in Package.swift",
                role, product_name
            )))
        }
    }

    /// Name of the first executable product, skipping the service worker if one is given.
    pub fn lookup_executable_name(&self, excluding: Option<&str>) -> Result<String, BuildError> {
        match self.dump_package()?.executable_name(excluding) {
            Some(name) => Ok(name.to_string()),
            None => {
                let excluding = excluding
                    .map(|name| format!(" (excluding service worker: {})", name))
                    .unwrap_or_default();
                Err(BuildError::ProductNotFound(format!(
                    "Unable to find app executable product in Package.swift{}",
                    excluding
                )))
            }
        }
    }

    /// `Sources` directories of local dependencies, for the file watcher.
    pub fn lookup_local_dependencies(&self) -> Result<Vec<String>, BuildError> {
        Ok(self.dump_package()?.local_dependency_sources())
    }

    /// Runs one command and classifies the outcome.
    pub fn execute(&self, command: &SwiftCommand) -> Result<String, BuildError> {
        self.execute_with_args(command, &[])
    }

    pub fn execute_with_args(
        &self,
        command: &SwiftCommand,
        extra_args: &[String],
    ) -> Result<String, BuildError> {
        let args = SwiftCommandBuilder::new()
            .with_command(command)
            .with_extra_args(extra_args)
            .build();
        let runner = ProcessRunner::new(&self.launch_path);
        let outcome = runner.run(&args, &self.working_directory, &marker_env())?;
        classify(command, outcome)
    }
}

/// Turns a runner outcome into the caller-facing result.
pub fn classify(command: &SwiftCommand, outcome: BuildOutcome) -> Result<String, BuildError> {
    let exit_code = match outcome {
        BuildOutcome::Success(text) => return Ok(text),
        BuildOutcome::Failure { exit_code, .. } => exit_code,
    };
    let text = match outcome.failure_text() {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(BuildError::ProcessFailure(exit_code)),
    };

    if command.is_build() {
        let errors = parse_compilation_errors(text);
        if errors.is_empty() {
            warn!("build failed but no diagnostics could be parsed");
            return Err(BuildError::RawText(UNPARSEABLE_ERRORS.to_string()));
        }
        info!("build failed with errors in {} files", errors.len());
        return Err(BuildError::Diagnostics(errors));
    }
    Err(BuildError::RawText(text.trim().to_string()))
}
