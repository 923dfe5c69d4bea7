use crate::e_swift::BuildError;
use crate::e_types::{DiagnosticsResult, FileDiagnostics};
use nu_ansi_term::{Color, Style};

/// Renders every file's errors, one block per file, places in line order.
///
/// ```text
/// main.swift (/p/Sources/App/main.swift)
///   10: missing return
///      return x
///          ^
/// ```
pub fn render_diagnostics(errors: &DiagnosticsResult, uses_color: bool) -> String {
    let mut out = String::new();
    for file in errors {
        render_file(&mut out, file, uses_color);
    }
    out
}

fn render_file(out: &mut String, file: &FileDiagnostics, uses_color: bool) {
    let title = file.display_name();
    let path = file.path().display().to_string();
    if uses_color {
        out.push_str(&format!(
            "{} ({})\n",
            Style::new().bold().underline().paint(&title),
            Color::DarkGray.paint(&path)
        ));
    } else {
        out.push_str(&format!("{} ({})\n", title, path));
    }

    let width = file
        .places()
        .iter()
        .map(|p| p.line.to_string().len())
        .max()
        .unwrap_or(0);
    for place in file.places() {
        let line = format!("{:>width$}", place.line, width = width);
        if uses_color {
            out.push_str(&format!(
                "  {}: {}\n",
                Color::Red.paint(&line),
                Color::White.bold().paint(&place.reason)
            ));
        } else {
            out.push_str(&format!("  {}: {}\n", line, place.reason));
        }
        let indent = " ".repeat(width + 4);
        out.push_str(&format!("{}{}\n", indent, place.code_excerpt));
        if uses_color {
            out.push_str(&format!("{}{}\n", indent, Color::Green.paint(&place.pointer)));
        } else {
            out.push_str(&format!("{}{}\n", indent, place.pointer));
        }
    }
}

/// A user-facing report for any build error.
pub fn render_build_error(err: &BuildError, uses_color: bool) -> String {
    let headline = err.to_string();
    let headline = if uses_color {
        Color::Red.bold().paint(&headline).to_string()
    } else {
        headline
    };
    match err {
        BuildError::Diagnostics(errors) => {
            format!("{}\n{}", headline, render_diagnostics(errors, uses_color))
        }
        _ => format!("{}\n", headline),
    }
}
