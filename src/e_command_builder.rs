/// Triple used for cross builds.
pub const WASM_TRIPLE: &str = "wasm32-unknown-wasi";
/// Native builds go here so they never clobber the wasm artifacts in `./.build`.
pub const NATIVE_BUILD_PATH: &str = "./.build/.native";
/// Throwaway build directory for preview runs.
pub const LIVE_BUILD_PATH: &str = "./.build/.live";

/// Platform a product is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetTriple {
    Native,
    #[default]
    Wasm,
}

/// Something we can ask the Swift toolchain to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwiftCommand {
    Version,
    Dump,
    Build {
        release: bool,
        product_name: String,
        triple: TargetTriple,
    },
    Previews {
        module_name: String,
        preview_names: Vec<String>,
    },
}

impl SwiftCommand {
    /// Only build failures are worth running through the diagnostics parser.
    pub fn is_build(&self) -> bool {
        matches!(self, SwiftCommand::Build { .. })
    }

    /// The argument vector for this command. Never fails and never touches disk.
    ///
    /// # Example
    /// ```
    /// use webber_tools::e_command_builder::{SwiftCommand, TargetTriple};
    ///
    /// let args = SwiftCommand::Build {
    ///     release: false,
    ///     product_name: "App".to_string(),
    ///     triple: TargetTriple::Native,
    /// }
    /// .arguments();
    /// assert_eq!(
    ///     args,
    ///     vec!["build", "-c", "debug", "--product", "App", "--enable-test-discovery",
    ///          "--build-path", "./.build/.native"]
    /// );
    /// ```
    pub fn arguments(&self) -> Vec<String> {
        match self {
            SwiftCommand::Version => vec!["--version".into()],
            SwiftCommand::Dump => vec!["package".into(), "dump-package".into()],
            SwiftCommand::Build {
                release,
                product_name,
                triple,
            } => {
                let mut args: Vec<String> = vec![
                    "build".into(),
                    "-c".into(),
                    if *release { "release" } else { "debug" }.into(),
                    "--product".into(),
                    product_name.clone(),
                    "--enable-test-discovery".into(),
                ];
                match triple {
                    TargetTriple::Wasm => {
                        args.push("--triple".into());
                        args.push(WASM_TRIPLE.into());
                        for flag in ["-licuuc", "-licui18n", "--stack-first"] {
                            args.push("-Xlinker".into());
                            args.push(flag.into());
                        }
                    }
                    TargetTriple::Native => {
                        args.push("--build-path".into());
                        args.push(NATIVE_BUILD_PATH.into());
                    }
                }
                args
            }
            SwiftCommand::Previews {
                module_name,
                preview_names,
            } => {
                let selector = preview_names
                    .iter()
                    .map(|name| format!("{}/{}", module_name, name))
                    .collect::<Vec<_>>()
                    .join(",");
                vec![
                    "run".into(),
                    "-Xswiftc".into(),
                    "-DWEBPREVIEW".into(),
                    module_name.clone(),
                    "--previews".into(),
                    selector,
                    "--build-path".into(),
                    LIVE_BUILD_PATH.into(),
                ]
            }
        }
    }
}

/// A builder that constructs a Swift toolchain command line.
#[derive(Debug, Clone, Default)]
pub struct SwiftCommandBuilder {
    pub args: Vec<String>,
}

impl SwiftCommandBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        SwiftCommandBuilder { args: Vec::new() }
    }

    /// Configures the command based on the provided SwiftCommand.
    pub fn with_command(mut self, command: &SwiftCommand) -> Self {
        self.args.extend(command.arguments());
        self
    }

    /// Appends toolchain flags (`-Xswiftc -g`, `--jobs 4`) after the command's own.
    pub fn with_extra_args(mut self, extra: &[String]) -> Self {
        self.args.extend(extra.iter().cloned());
        self
    }

    /// Builds the final vector of command-line arguments.
    pub fn build(self) -> Vec<String> {
        self.args
    }
}
