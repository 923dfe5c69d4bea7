//! # webber
//!
//! `webber` drives the Swift toolchain for a webber project and prints
//! compiler errors grouped by file instead of the raw build log.
//!
//! ## Quick Start
//! ```sh
//! webber build --product App
//! webber previews --module App Home About
//! webber build --release -- -Xswiftc -g
//! ```

use anyhow::Context;
use clap::Parser;
use webber_tools::e_cli::{Cli, Commands};
use webber_tools::e_findmain::{module_name_for, preview_names_in_file};
use webber_tools::e_reports::render_build_error;
use webber_tools::prelude::*;
use webber_tools::{BuildError, Swift, TargetTriple};

pub fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();

    let cli = Cli::parse();
    debug!("CLI options: {:?}", cli);

    let dir = match cli.dir.clone() {
        Some(dir) => dir,
        None => env::current_dir().context("unable to read the current directory")?,
    };
    let swift = match cli.toolchain.clone() {
        Some(toolchain) => Swift::new(toolchain, dir),
        None => Swift::locate(dir).context("`swift` not found on PATH; pass --toolchain")?,
    };
    info!(
        "toolchain {} in {}",
        swift.launch_path().display(),
        swift.working_directory().display()
    );

    match run(&cli, &swift) {
        Ok(()) => Ok(()),
        Err(err) => {
            eprint!("{}", render_build_error(&err, !cli.no_color));
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, swift: &Swift) -> Result<(), BuildError> {
    match &cli.command {
        Commands::Version => {
            print!("{}", swift.version()?);
        }
        Commands::Dump => {
            print!("{}", swift.execute(&webber_tools::SwiftCommand::Dump)?);
        }
        Commands::Build {
            product,
            release,
            native,
            extra_args,
        } => {
            let product = match product {
                Some(product) => product.clone(),
                None => swift.lookup_executable_name(None)?,
            };
            let triple = if *native {
                TargetTriple::Native
            } else {
                TargetTriple::Wasm
            };
            println!("Building {} ({:?})", product, triple);
            print!(
                "{}",
                swift.build_with_args(&product, *release, triple, extra_args)?
            );
            println!("Build succeeded: {}", product);
        }
        Commands::Previews {
            module,
            from_file,
            names,
        } => {
            let mut names = names.clone();
            if let Some(file) = from_file {
                let found = preview_names_in_file(file).map_err(|e| {
                    BuildError::RawText(format!("Unable to read {}: {}", file.display(), e))
                })?;
                names.extend(found);
            }
            let module = module
                .clone()
                .or_else(|| from_file.as_deref().and_then(module_name_for))
                .ok_or_else(|| {
                    BuildError::RawText("Pass --module or a --from-file under Sources/".into())
                })?;
            if names.is_empty() {
                return Err(BuildError::RawText(format!(
                    "No previews found for module {}",
                    module
                )));
            }
            for preview in swift.previews(&module, &names)? {
                println!(
                    "{}/{} \"{}\" {}x{} ({} bytes of html)",
                    preview.module,
                    preview.class_name,
                    preview.title,
                    preview.width,
                    preview.height,
                    preview.html.len()
                );
            }
        }
        Commands::Products => {
            let package = swift.dump_package()?;
            for product in package.executable_products() {
                println!("{}", product.name);
            }
        }
        Commands::LocalDeps => {
            for dir in swift.lookup_local_dependencies()? {
                println!("{}", dir);
            }
        }
    }
    Ok(())
}
