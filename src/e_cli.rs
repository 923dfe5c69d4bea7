use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds and previews webber projects with the Swift toolchain.", long_about = None)]
pub struct Cli {
    /// Path to the `swift` executable.
    #[arg(
        long,
        short = 't',
        env = "WEBBER_SWIFT",
        global = true,
        help = "Swift toolchain to use (default: `swift` on PATH)."
    )]
    pub toolchain: Option<PathBuf>,

    #[arg(
        long,
        short = 'd',
        global = true,
        help = "Project directory (default: current directory)."
    )]
    pub dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output.")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the toolchain version.
    Version,
    /// Print the package manifest as JSON.
    Dump,
    /// Build a product and report compiler errors file by file.
    Build {
        #[arg(long, short = 'p', help = "Product to build (default: first executable product).")]
        product: Option<String>,

        #[arg(long, short = 'r', help = "Build with the release configuration.")]
        release: bool,

        #[arg(long, help = "Build for the host instead of wasm.")]
        native: bool,

        #[arg(last = true, help = "Extra flags passed to `swift build` (after `--`).")]
        extra_args: Vec<String>,
    },
    /// Render previews for a module.
    Previews {
        #[arg(long, short = 'm', help = "Module that declares the previews.")]
        module: Option<String>,

        #[arg(long, help = "Collect preview names from this source file.")]
        from_file: Option<PathBuf>,

        #[arg(help = "Preview names (without the `_Preview` suffix).")]
        names: Vec<String>,
    },
    /// List executable products.
    Products,
    /// List the source directories of local dependencies.
    LocalDeps,
}
