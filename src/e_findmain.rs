// src/e_findmain.rs

use crate::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;

static PREVIEW_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"class\s+(\w+)_Preview\s*:\s*WebPreview\b").expect("invalid preview pattern")
});

/// Returns the name of every `class NAME_Preview: WebPreview` declaration in
/// `source`, in the order they appear. The `_Preview` suffix is stripped, which
/// is the form the `--previews` selector expects.
///
/// # Example
/// ```
/// use webber_tools::e_findmain::extract_preview_names;
///
/// let source = "class Home_Preview: WebPreview {}\nclass About_Preview: WebPreview {}";
/// assert_eq!(extract_preview_names(source), vec!["Home", "About"]);
/// ```
pub fn extract_preview_names(source: &str) -> Vec<String> {
    PREVIEW_CLASS
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Reads `file` and extracts its preview names.
pub fn preview_names_in_file(file: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(file)?;
    Ok(extract_preview_names(&content))
}

/// Guesses the module a source file belongs to from a `.../Sources/<Module>/...` path.
pub fn module_name_for(file: &Path) -> Option<String> {
    let mut components = file.components().map(|c| c.as_os_str().to_string_lossy());
    components.find(|c| c == "Sources")?;
    let module = components.next()?.to_string();
    // `Sources/main.swift` has no module directory.
    if file.file_name()?.to_string_lossy() == module {
        return None;
    }
    Some(module)
}
