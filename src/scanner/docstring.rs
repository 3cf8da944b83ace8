// Docstring section parsing
//
// Recognizes Google-style sections (`Args:`), NumPy-style underlined
// sections and Sphinx field lists. Anything unrecognized yields empty
// results rather than an error.

use crate::model::DocstringStyle;

/// Google section headers that open a parameter list
const PARAM_HEADERS: [&str; 6] = [
    "args",
    "arguments",
    "parameters",
    "params",
    "keyword args",
    "keyword arguments",
];

/// Headers that end a section
const OTHER_HEADERS: [&str; 20] = [
    "returns",
    "return",
    "yields",
    "yield",
    "raises",
    "raise",
    "examples",
    "example",
    "notes",
    "note",
    "attributes",
    "see also",
    "references",
    "todo",
    "warning",
    "warnings",
    "other parameters",
    "methods",
    "exceptions",
    "except",
];

const RETURN_HEADERS: [&str; 4] = ["returns", "return", "yields", "yield"];
const RAISE_HEADERS: [&str; 3] = ["raises", "raise", "exceptions"];

const SPHINX_PARAM_FIELDS: [&str; 6] = ["param", "parameter", "arg", "argument", "key", "keyword"];
const SPHINX_RETURN_FIELDS: [&str; 5] = ["return", "returns", "rtype", "yield", "yields"];
const SPHINX_RAISE_FIELDS: [&str; 4] = ["raises", "raise", "except", "exception"];

/// Everything extracted from one docstring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocstringInfo {
    /// Documented parameter names in order of appearance
    pub params: Vec<String>,
    pub has_return: bool,
    pub raises: Vec<String>,
    pub style: DocstringStyle,
    pub style_issues: Vec<String>,
}

/// Analyze an optional docstring
pub fn analyze(docstring: Option<&str>) -> DocstringInfo {
    match docstring {
        Some(text) if !text.trim().is_empty() => analyze_text(text),
        _ => DocstringInfo::default(),
    }
}

fn analyze_text(text: &str) -> DocstringInfo {
    let lines: Vec<&str> = text.lines().collect();

    let google = google_sections(&lines);
    let numpy = numpy_sections(&lines);
    let sphinx = sphinx_fields(&lines);

    let mut styles = Vec::new();
    if !google.is_empty() {
        styles.push(DocstringStyle::Google);
    }
    if !numpy.is_empty() {
        styles.push(DocstringStyle::Numpy);
    }
    if sphinx.any() {
        styles.push(DocstringStyle::Sphinx);
    }

    let mut info = DocstringInfo {
        style: styles.first().copied().unwrap_or(DocstringStyle::Plain),
        ..Default::default()
    };

    let google_params = entries_of(&google, &PARAM_HEADERS);
    let numpy_params = entries_of(&numpy, &["parameters", "other parameters"]);
    let params = if !google_params.is_empty() {
        google_params
    } else if !numpy_params.is_empty() {
        numpy_params
    } else {
        sphinx.params.iter().map(|p| Entry::named(p)).collect()
    };

    for entry in &params {
        if !info.params.contains(&entry.name) {
            info.params.push(entry.name.clone());
        }
        if !entry.described {
            info.style_issues
                .push(format!("Parameter '{}' has no description", entry.name));
        }
    }

    info.has_return = google.iter().chain(numpy.iter()).any(|s| RETURN_HEADERS.contains(&s.header.as_str()))
        || sphinx.has_return;

    let mut raises: Vec<String> = entries_of(&google, &RAISE_HEADERS)
        .into_iter()
        .chain(entries_of(&numpy, &RAISE_HEADERS))
        .map(|e| e.name)
        .collect();
    raises.extend(sphinx.raises.iter().cloned());
    for name in raises {
        if !info.raises.contains(&name) {
            info.raises.push(name);
        }
    }

    if styles.len() > 1 {
        let names: Vec<&str> = styles.iter().map(|s| s.as_str()).collect();
        info.style_issues
            .insert(0, format!("Mixed docstring styles: {}", names.join(", ")));
    }

    let summary = lines.first().map(|l| l.trim()).unwrap_or("");
    if !summary.is_empty() && !summary.ends_with(['.', '!', '?', ':']) {
        info.style_issues
            .push("Summary line should end with a period".to_string());
    }
    if lines.len() > 1 && !lines[1].trim().is_empty() {
        info.style_issues
            .push("Missing blank line after summary".to_string());
    }

    info
}

/// Documented parameter names only
pub fn documented_params(docstring: &str) -> Vec<String> {
    analyze(Some(docstring)).params
}

/// A named entry in a section
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: String,
    described: bool,
}

impl Entry {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            described: true,
        }
    }
}

/// A recognized section: lowercase header plus its entries
#[derive(Debug, Clone)]
struct Section {
    header: String,
    entries: Vec<Entry>,
}

fn entries_of(sections: &[Section], headers: &[&str]) -> Vec<Entry> {
    sections
        .iter()
        .filter(|s| headers.contains(&s.header.as_str()))
        .flat_map(|s| s.entries.iter().cloned())
        .collect()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Lowercase header name if the line is a Google-style `Header:` line
fn google_header(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let name = trimmed.strip_suffix(':')?.trim().to_lowercase();
    if PARAM_HEADERS.contains(&name.as_str()) || OTHER_HEADERS.contains(&name.as_str()) {
        Some(name)
    } else {
        None
    }
}

fn google_sections(lines: &[&str]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(header) = google_header(lines[i]) else {
            i += 1;
            continue;
        };
        let header_indent = indent_of(lines[i]);
        let mut end = i + 1;
        while end < lines.len() && google_header(lines[end]).is_none() {
            end += 1;
        }
        let body = &lines[i + 1..end];
        sections.push(Section {
            entries: google_entries(body, header_indent),
            header,
        });
        i = end;
    }
    sections
}

/// Entries sit at the first indentation level below the header
fn google_entries(body: &[&str], header_indent: usize) -> Vec<Entry> {
    let entry_indent = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .find(|&indent| indent > header_indent);
    let Some(entry_indent) = entry_indent else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for (idx, line) in body.iter().enumerate() {
        if line.trim().is_empty() || indent_of(line) != entry_indent {
            continue;
        }
        let Some((name, rest)) = google_entry(line.trim()) else {
            continue;
        };
        let continued = body
            .get(idx + 1)
            .map_or(false, |next| !next.trim().is_empty() && indent_of(next) > entry_indent);
        entries.push(Entry {
            name,
            described: !rest.trim().is_empty() || continued,
        });
    }
    entries
}

/// Parse `name: text` or `name (type): text`
fn google_entry(line: &str) -> Option<(String, &str)> {
    let name_end = line
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '*'))
        .unwrap_or(line.len());
    let name = &line[..name_end];
    if name.is_empty() || name.trim_start_matches('*').is_empty() {
        return None;
    }
    let mut rest = line[name_end..].trim_start();
    if rest.starts_with('(') {
        let close = rest.find(')')?;
        rest = rest[close + 1..].trim_start();
    }
    let rest = rest.strip_prefix(':')?;
    Some((name.to_string(), rest))
}

fn is_underline(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

fn numpy_sections(lines: &[&str]) -> Vec<Section> {
    let headers: Vec<usize> = (0..lines.len().saturating_sub(1))
        .filter(|&i| !lines[i].trim().is_empty() && is_underline(lines[i + 1]) && !is_underline(lines[i]))
        .collect();

    let mut sections = Vec::new();
    for (n, &start) in headers.iter().enumerate() {
        let end = headers.get(n + 1).copied().unwrap_or(lines.len());
        let header_indent = indent_of(lines[start]);
        let body = &lines[start + 2..end];
        let mut entries = Vec::new();
        for (idx, line) in body.iter().enumerate() {
            if line.trim().is_empty() || indent_of(line) != header_indent {
                continue;
            }
            let declared = line.trim().split(" :").next().unwrap_or("").trim();
            let declared = declared.strip_suffix(':').unwrap_or(declared);
            let described = body
                .get(idx + 1)
                .map_or(false, |next| !next.trim().is_empty() && indent_of(next) > header_indent);
            for name in declared.split(',').map(str::trim) {
                let valid = !name.is_empty()
                    && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '*' || c == '.');
                if valid {
                    entries.push(Entry {
                        name: name.to_string(),
                        described,
                    });
                }
            }
        }
        sections.push(Section {
            header: lines[start].trim().to_lowercase(),
            entries,
        });
    }
    sections
}

/// Sphinx field-list findings
#[derive(Debug, Default)]
struct SphinxFields {
    params: Vec<String>,
    raises: Vec<String>,
    has_return: bool,
}

impl SphinxFields {
    fn any(&self) -> bool {
        !self.params.is_empty() || !self.raises.is_empty() || self.has_return
    }
}

/// Scan `:field arg arg:` tokens anywhere in the text
fn sphinx_fields(lines: &[&str]) -> SphinxFields {
    let mut fields = SphinxFields::default();
    for line in lines {
        let mut rest = line.trim();
        while let Some(start) = rest.find(':') {
            let after = &rest[start + 1..];
            let Some(end) = after.find(':') else {
                break;
            };
            let field = &after[..end];
            let mut words = field.split_whitespace();
            let keyword = words.next().unwrap_or("");
            let args: Vec<&str> = words.collect();

            if SPHINX_PARAM_FIELDS.contains(&keyword) {
                if let Some(name) = args.last() {
                    fields.params.push(name.to_string());
                }
            } else if SPHINX_RAISE_FIELDS.contains(&keyword) {
                if let Some(name) = args.last() {
                    fields.raises.push(name.to_string());
                }
            } else if SPHINX_RETURN_FIELDS.contains(&keyword) && args.is_empty() {
                fields.has_return = true;
            } else {
                rest = &rest[start + 1..];
                continue;
            }
            rest = &after[end + 1..];
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_args() {
        assert_eq!(documented_params("Args:\n    foo (int): bar\n"), vec!["foo"]);
    }

    #[test]
    fn test_google_args_terminated_by_returns() {
        let doc = "Get a user.\n\nArgs:\n    user_id: The ID.\n    active (bool): Filter.\n\nReturns:\n    result: The user.";
        let info = analyze(Some(doc));
        assert_eq!(info.params, vec!["user_id", "active"]);
        assert!(info.has_return);
        assert_eq!(info.style, DocstringStyle::Google);
        assert!(info.style_issues.is_empty());
    }

    #[test]
    fn test_google_star_args() {
        let doc = "Call it.\n\nArgs:\n    *args: Positional.\n    **kwargs: Keywords.";
        assert_eq!(documented_params(doc), vec!["*args", "**kwargs"]);
    }

    #[test]
    fn test_google_continuation_lines_ignored() {
        let doc = "Do it.\n\nArgs:\n    path: Where to look.\n        note: not a param\n    depth: How deep.";
        assert_eq!(documented_params(doc), vec!["path", "depth"]);
    }

    #[test]
    fn test_numpy_parameters() {
        let doc = "Compute things.\n\nParameters\n----------\nx : int\n    First value.\ny, z : float\n    Others.\n\nReturns\n-------\nint\n    The sum.";
        let info = analyze(Some(doc));
        assert_eq!(info.params, vec!["x", "y", "z"]);
        assert!(info.has_return);
        assert_eq!(info.style, DocstringStyle::Numpy);
    }

    #[test]
    fn test_sphinx_fallback() {
        let doc = "Create a user.\n\n:param name: The name.\n:param int age: The age.\n:returns: The user.\n:raises ValueError: On bad input.";
        let info = analyze(Some(doc));
        assert_eq!(info.params, vec!["name", "age"]);
        assert!(info.has_return);
        assert_eq!(info.raises, vec!["ValueError"]);
        assert_eq!(info.style, DocstringStyle::Sphinx);
    }

    #[test]
    fn test_google_raises() {
        let doc = "Load it.\n\nRaises:\n    NotFoundError: When missing.\n    ValueError: When bad.";
        let info = analyze(Some(doc));
        assert_eq!(info.raises, vec!["NotFoundError", "ValueError"]);
        assert!(!info.has_return);
    }

    #[test]
    fn test_plain_docstring() {
        let info = analyze(Some("Just a sentence."));
        assert_eq!(info.style, DocstringStyle::Plain);
        assert!(info.params.is_empty());
        assert!(info.style_issues.is_empty());
    }

    #[test]
    fn test_no_docstring() {
        let info = analyze(None);
        assert_eq!(info.style, DocstringStyle::None);
        assert!(info.params.is_empty());
        assert!(!info.has_return);
    }

    #[test]
    fn test_prose_return_is_not_documentation() {
        assert!(!analyze(Some("Return the current user.")).has_return);
        assert!(!analyze(Some("Yields rows one at a time.")).has_return);
        assert!(analyze(Some("Current user.\n\nReturns:\n    The user.\n")).has_return);
    }

    #[test]
    fn test_style_issues() {
        let info = analyze(Some("Summary without period\nsecond line"));
        assert!(info.style_issues.contains(&"Summary line should end with a period".to_string()));
        assert!(info.style_issues.contains(&"Missing blank line after summary".to_string()));
    }

    #[test]
    fn test_param_without_description() {
        let info = analyze(Some("Do it.\n\nArgs:\n    flag:\n"));
        assert_eq!(info.params, vec!["flag"]);
        assert!(info.style_issues.contains(&"Parameter 'flag' has no description".to_string()));
    }

    #[test]
    fn test_mixed_styles() {
        let doc = "Do it.\n\nArgs:\n    a: First.\n\n:returns: Nothing.";
        let info = analyze(Some(doc));
        assert_eq!(info.style, DocstringStyle::Google);
        assert_eq!(info.style_issues[0], "Mixed docstring styles: google, sphinx");
    }

    #[test]
    fn test_malformed_degrades() {
        let info = analyze(Some("Args:\n(((\n:param\n----"));
        assert!(info.params.is_empty());
    }
}
