#![allow(dead_code)]
use std::fs;
use std::io::Result as IoResult;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::{tempdir, TempDir};

/// Held while writing and running fake toolchains. Executing a script that
/// another thread of this process still has open for writing (inherited across
/// a concurrent fork) fails with ETXTBSY.
static TOOLCHAIN_LOCK: Mutex<()> = Mutex::new(());

pub fn serial() -> MutexGuard<'static, ()> {
    TOOLCHAIN_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A shell script standing in for `swift`, living in its own project directory.
pub struct FakeToolchain {
    /// The temporary directory. When this is dropped, the directory and its contents are removed.
    pub temp_dir: TempDir,
    /// The project root the toolchain runs in.
    pub root: PathBuf,
    /// The fake `swift` executable.
    pub swift: PathBuf,
    /// Every invocation appends its arguments here, one line per call.
    pub log: PathBuf,
}

impl FakeToolchain {
    /// Writes a fake toolchain whose behavior is the given `case "$1" in ... esac` body.
    pub fn new(case_body: &str) -> IoResult<Self> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path().join("site");
        fs::create_dir_all(root.join("Sources").join("App"))?;
        let swift = temp_dir.path().join("swift");
        let log = temp_dir.path().join("invocations.log");
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\ncase \"$1\" in\n{}\nesac\n",
            log.display(),
            case_body
        );
        fs::write(&swift, script)?;
        make_executable(&swift)?;
        Ok(FakeToolchain {
            temp_dir,
            root,
            swift,
            log,
        })
    }

    /// Returns a reference to the project root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Argument lines of every call made so far.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> IoResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> IoResult<()> {
    Ok(())
}

pub const DUMP_JSON: &str = r#"{
  "name": "Site",
  "products": [
    {"name": "App", "type": {"executable": null}, "targets": ["App"]},
    {"name": "Service", "type": {"executable": null}, "targets": ["Service"]}
  ],
  "targets": [{"name": "App", "path": "Sources/App"}],
  "dependencies": [
    {"scm": [{"identity": "web", "requirement": {"localPackage": null}, "location": "/work/web"}]}
  ]
}"#;

pub const BUILD_ERRORS: &str = "\
Compiling App main.swift
/p/Sources/App/view.swift:7:3: error: cannot find 'Div' in scope
  Div()
  ^
/p/Sources/App/main.swift:10:5: error: missing return
return x
    ^
/p/Sources/App/main.swift:20:1: error: unexpected token
func f() {
^
";

/// A toolchain that behaves like a healthy project whose build is broken.
pub fn broken_build_toolchain() -> IoResult<FakeToolchain> {
    FakeToolchain::new(&format!(
        "--version) printf 'Swift version 5.9-fake\\n' ;;\n\
         package) cat <<'JSON'\n{}\nJSON\n;;\n\
         build) cat <<'LOG'\n{}LOG\nexit 1 ;;\n\
         *) echo \"unknown command $1\" >&2; exit 64 ;;",
        DUMP_JSON, BUILD_ERRORS
    ))
}
