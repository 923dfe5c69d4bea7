use crate::e_types::{DiagnosticPlace, DiagnosticsResult, FileDiagnostics};
use crate::prelude::*;
use std::collections::VecDeque;

/// Character the compiler uses to point at the offending column.
pub const POINTER_MARKER: char = '^';

/// Header lines look like `path:line:column:severity:message`.
const HEADER_FIELDS: usize = 5;

/// Fields of a header line that passed the shape check.
struct Header<'a> {
    path: &'a str,
    line: &'a str,
    message: &'a str,
}

/// Parses Swift compiler output into per-file errors.
///
/// Every error is a three line block: a header, the source line and a caret
/// line. Blocks for the same file that follow each other are grouped; a
/// malformed block ends its group without losing what was collected before it.
///
/// # Example
/// ```
/// use webber_tools::e_parser::parse_compilation_errors;
///
/// let raw = "/p/Sources/App/main.swift:10:5: error: missing return\n\
///            return x\n\
///            \x20   ^\n";
/// let errors = parse_compilation_errors(raw);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].places()[0].line, 10);
/// assert_eq!(errors[0].places()[0].reason, "missing return");
/// ```
pub fn parse_compilation_errors(raw: &str) -> DiagnosticsResult {
    parse_compilation_errors_with(raw, "swift")
}

/// Same as [`parse_compilation_errors`] for sources with another extension.
pub fn parse_compilation_errors_with(raw: &str, extension: &str) -> DiagnosticsResult {
    let marker = format!(".{}:", extension);
    let mut lines: VecDeque<&str> = raw.lines().collect();
    let mut errors: DiagnosticsResult = Vec::new();

    while let Some(line) = lines.pop_front() {
        if !looks_like_place(line, &marker) {
            continue;
        }
        let Some(mut header) = error_header(line) else {
            continue;
        };
        let path = header.path;
        let mut places: Vec<DiagnosticPlace> = Vec::new();

        loop {
            let Some(line_number) = parse_line_number(header.line) else {
                debug!("unreadable line number in {:?}", header.line);
                break;
            };
            let code_excerpt = lines.pop_front();
            let pointer = lines.pop_front();
            let (code_excerpt, pointer) = match (code_excerpt, pointer) {
                (Some(code), Some(pointer)) if pointer.contains(POINTER_MARKER) => (code, pointer),
                _ => {
                    debug!("dropping malformed block for {}:{}", path, line_number);
                    break;
                }
            };
            places.push(DiagnosticPlace::new(
                line_number,
                header.message.trim(),
                code_excerpt,
                pointer,
            ));

            // Keep the group open only while the next block is for the same file.
            let next = lines
                .front()
                .copied()
                .filter(|next| looks_like_place(next, &marker))
                .and_then(|next| error_header(next))
                .filter(|next| next.path == path);
            match next {
                Some(next) => {
                    header = next;
                    lines.pop_front();
                }
                None => break,
            }
        }

        flush(&mut errors, path, places);
    }

    errors.sort_by_key(|e| e.display_name());
    errors
}

fn looks_like_place(line: &str, marker: &str) -> bool {
    line.starts_with('/') && line.split('/').count() > 1 && line.contains(marker)
}

/// Splits a header line, rejecting anything that is not an error
/// (warnings and notes share the shape).
fn error_header(line: &str) -> Option<Header<'_>> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != HEADER_FIELDS || !fields[3].contains("error") {
        return None;
    }
    Some(Header {
        path: fields[0],
        line: fields[1],
        message: fields[4],
    })
}

fn parse_line_number(field: &str) -> Option<usize> {
    field.trim().parse::<usize>().ok().filter(|line| *line > 0)
}

/// Commits one file-group to the result, merging into an existing entry for
/// the same path.
fn flush(errors: &mut DiagnosticsResult, path: &str, places: Vec<DiagnosticPlace>) {
    if places.is_empty() {
        return;
    }
    let file = PathBuf::from(path);
    if let Some(existing) = errors.iter_mut().find(|e| e.file == file) {
        existing.merge(places);
    } else if let Some(created) = FileDiagnostics::new(file, places) {
        errors.push(created);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(errors: &DiagnosticsResult) -> Vec<(String, Vec<(usize, String)>)> {
        errors
            .iter()
            .map(|e| {
                (
                    e.display_name(),
                    e.places()
                        .iter()
                        .map(|p| (p.line, p.reason.clone()))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_consecutive_blocks_group_into_one_file() {
        let raw = "\
/p/Sources/App/main.swift:10:5: error: missing return
return x
    ^
/p/Sources/App/main.swift:20:1: error: unexpected token
func f() {
^
";
        let errors = parse_compilation_errors(raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file, PathBuf::from("/p/Sources/App/main.swift"));
        let places = errors[0].places();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].line, 10);
        assert_eq!(places[0].reason, "missing return");
        assert_eq!(places[0].code_excerpt, "return x");
        assert_eq!(places[0].pointer, "    ^");
        assert_eq!(places[1].line, 20);
    }

    #[test]
    fn test_out_of_order_lines_are_sorted() {
        let raw = "\
/p/Sources/App/main.swift:30:5: error: third
c
^
/p/Sources/App/main.swift:2:1: error: first
a
^
";
        let errors = parse_compilation_errors(raw);
        assert_eq!(
            summary(&errors),
            vec![(
                "main.swift".to_string(),
                vec![(2, "first".to_string()), (30, "third".to_string())]
            )]
        );
    }

    #[test]
    fn test_repeated_block_is_deduplicated() {
        let block = "/p/Sources/App/main.swift:10:5: error: missing return\nreturn x\n    ^\n";
        let raw = format!("{}{}", block, block);
        let errors = parse_compilation_errors(&raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].places().len(), 1);

        // The same again with unrelated output in between, so the second copy
        // is merged into the existing entry instead of the open group.
        let raw = format!("{}Compiling App main.swift\n{}", block, block);
        let errors = parse_compilation_errors(&raw);
        assert_eq!(errors[0].places().len(), 1);
    }

    #[test]
    fn test_files_sorted_by_display_name() {
        let raw = "\
/p/Sources/Zed/zeta.swift:1:1: error: z
z
^
/p/Sources/App/main.swift:1:1: error: m
m
^
/p/Sources/Zed/alpha.swift:1:1: error: a
a
^
";
        let names: Vec<String> = parse_compilation_errors(raw)
            .iter()
            .map(|e| e.display_name())
            .collect();
        assert_eq!(names, vec!["alpha.swift", "main.swift", "zeta.swift"]);
    }

    #[test]
    fn test_no_headers_gives_empty_result() {
        assert!(parse_compilation_errors("").is_empty());
        assert!(parse_compilation_errors("Compiling App\nerror: linker command failed\n").is_empty());
        // Warnings share the shape but are not errors.
        let raw = "/p/Sources/App/main.swift:3:9: warning: unused variable\nlet x = 1\n    ^\n";
        assert!(parse_compilation_errors(raw).is_empty());
        // Too many colons.
        let raw = "/p/Sources/App/main.swift:3:9: error: expected ':' here\nlet x\n    ^\n";
        assert!(parse_compilation_errors(raw).is_empty());
    }

    #[test]
    fn test_bad_line_number_keeps_earlier_places() {
        let raw = "\
/p/Sources/App/main.swift:10:5: error: missing return
return x
    ^
/p/Sources/App/main.swift:abc:1: error: garbage
oops
^
";
        let errors = parse_compilation_errors(raw);
        assert_eq!(
            summary(&errors),
            vec![(
                "main.swift".to_string(),
                vec![(10, "missing return".to_string())]
            )]
        );
    }

    #[test]
    fn test_pointer_without_marker_drops_only_that_block() {
        let raw = "\
/p/Sources/App/main.swift:10:5: error: missing return
return x
    ^
/p/Sources/App/main.swift:12:5: error: broken block
let y
no caret here
/p/Sources/App/other.swift:4:2: error: still parsed
z
 ^
";
        let errors = parse_compilation_errors(raw);
        assert_eq!(
            summary(&errors),
            vec![
                (
                    "main.swift".to_string(),
                    vec![(10, "missing return".to_string())]
                ),
                (
                    "other.swift".to_string(),
                    vec![(4, "still parsed".to_string())]
                ),
            ]
        );
    }

    #[test]
    fn test_truncated_trailing_block_is_ignored() {
        let raw = "\
/p/Sources/App/main.swift:10:5: error: missing return
return x
    ^
/p/Sources/App/main.swift:11:5: error: cut off
let y";
        let errors = parse_compilation_errors(raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].places().len(), 1);
    }

    #[test]
    fn test_interleaved_files_merge_per_path() {
        let raw = "\
/p/Sources/App/main.swift:20:1: error: later
b
^
/p/Sources/App/view.swift:5:1: error: view
v
^
/p/Sources/App/main.swift:4:1: error: earlier
a
^
";
        let errors = parse_compilation_errors(raw);
        assert_eq!(
            summary(&errors),
            vec![
                (
                    "main.swift".to_string(),
                    vec![(4, "earlier".to_string()), (20, "later".to_string())]
                ),
                ("view.swift".to_string(), vec![(5, "view".to_string())]),
            ]
        );
    }

    #[test]
    fn test_relative_paths_are_not_headers() {
        let raw = "Sources/App/main.swift:10:5: error: missing return\nreturn x\n    ^\n";
        assert!(parse_compilation_errors(raw).is_empty());
    }

    #[test]
    fn test_other_extension() {
        let raw = "/p/src/lib.rs:7:3: error: boom\nlet a\n  ^\n";
        assert!(parse_compilation_errors(raw).is_empty());
        let errors = parse_compilation_errors_with(raw, "rs");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].display_name(), "lib.rs");
    }
}
