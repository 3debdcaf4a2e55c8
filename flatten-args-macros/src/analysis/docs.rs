//! Documentation for the generated constructor.
//!
//! Best-effort: missing or oddly shaped docs only make the output less
//! specific, they never fail the expansion.

use std::collections::BTreeMap;

use quote::quote;
use syn::Type;

use super::collect::Property;
use super::effect::Forwarding;
use crate::model::TypeDecl;

/// Docs split at the parameters section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDoc {
    pub summary: Vec<String>,
    pub parameters: BTreeMap<String, String>,
}

enum State {
    Summary,
    /// Inside a section other than the parameters one.
    Other,
    Parameters { current: Option<String> },
    Done,
}

/// Split doc lines into a summary and a per-parameter text map.
///
/// The summary stops at the first heading. The parameters section starts at
/// `# Arguments`, `# Parameters` or `- Parameters:` and ends at the next
/// heading. Inside it, `* `name` - text` or `- name: text` starts an entry and
/// following lines continue it.
pub fn parse(lines: &[String]) -> ParsedDoc {
    let mut doc = ParsedDoc::default();
    let mut state = State::Summary;

    for line in lines {
        state = match state {
            State::Summary | State::Other if is_parameters_marker(line) => {
                State::Parameters { current: None }
            }
            State::Summary if heading(line).is_some() => State::Other,
            State::Summary => {
                doc.summary.push(line.clone());
                State::Summary
            }
            State::Other => State::Other,
            State::Parameters { .. } if heading(line).is_some() => State::Done,
            State::Parameters { current } => {
                if let Some((name, text)) = parameter_entry(line) {
                    doc.parameters.insert(name.clone(), text);
                    State::Parameters { current: Some(name) }
                } else if line.trim().is_empty() {
                    State::Parameters { current: None }
                } else {
                    let entry = current.as_ref().and_then(|name| doc.parameters.get_mut(name));
                    if let Some(text) = entry {
                        if !text.is_empty() {
                            text.push(' ');
                        }
                        text.push_str(line.trim());
                    }
                    State::Parameters { current }
                }
            }
            State::Done => State::Done,
        };
    }

    trim_blank(&mut doc.summary);
    doc
}

/// Lines before the first heading.
pub fn leading_summary(lines: &[String]) -> Vec<String> {
    let mut summary: Vec<String> = lines
        .iter()
        .take_while(|line| heading(line).is_none())
        .cloned()
        .collect();
    trim_blank(&mut summary);
    summary
}

/// The `# Errors` section, or the text of a `- Throws:` line.
pub fn errors(lines: &[String]) -> Option<Vec<String>> {
    if let Some(start) = lines
        .iter()
        .position(|line| heading(line).is_some_and(|h| h.eq_ignore_ascii_case("errors")))
    {
        let mut section: Vec<String> = lines[start + 1..]
            .iter()
            .take_while(|line| heading(line).is_none())
            .cloned()
            .collect();
        trim_blank(&mut section);
        if !section.is_empty() {
            return Some(section);
        }
    }

    lines.iter().find_map(|line| {
        let rest = bullet(line)?;
        let (key, text) = rest.split_once(':')?;
        let text = text.trim();
        (key.trim().eq_ignore_ascii_case("throws") && !text.is_empty())
            .then(|| vec![text.to_string()])
    })
}

/// Final documentation of a generated constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documentation {
    pub summary: Vec<String>,
    /// `(name, text)` for each flat parameter, in parameter order.
    pub parameters: Vec<(String, String)>,
    pub errors: Option<Vec<String>>,
}

impl Documentation {
    pub fn synthesize(
        container: &TypeDecl,
        bundle: &TypeDecl,
        forwarding: Option<&Forwarding<'_>>,
        properties: &[Property],
    ) -> Self {
        let bundle_doc = bundle
            .constructors
            .iter()
            .find(|c| !c.inputs.is_empty())
            .map(|c| parse(&c.doc))
            .unwrap_or_default();

        let mut summary = bundle_doc.summary.clone();
        if summary.is_empty() {
            if let Some(f) = forwarding {
                summary = leading_summary(&f.ctor.doc);
            }
        }
        if summary.is_empty() {
            let how = if bundle.default_constructor().is_some() {
                "the default"
            } else {
                "the individual fields of its"
            };
            summary.push(format!(
                "Creates a `{}` from {} `{}`.",
                container.ident, how, bundle.ident
            ));
        }

        let parameters = properties
            .iter()
            .filter(|p| p.is_parameter())
            .map(|p| {
                let text = bundle_doc
                    .parameters
                    .get(&p.name)
                    .cloned()
                    .or_else(|| joined(&p.doc))
                    .unwrap_or_else(|| format!("A value of type `{}`.", type_name(&p.ty)));
                (p.name.clone(), text)
            })
            .collect();

        let errors = forwarding.filter(|f| f.effect.is_throwing()).map(|f| {
            errors(&f.ctor.doc).unwrap_or_else(|| {
                vec![format!(
                    "Returns an error if `{}::{}` rejects the assembled arguments.",
                    container.ident, f.ctor.ident
                )]
            })
        });

        Self {
            summary,
            parameters,
            errors,
        }
    }

    /// Rustdoc lines, without the leading space.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.summary.clone();

        if !self.parameters.is_empty() {
            lines.extend([String::new(), "# Arguments".into(), String::new()]);
            lines.extend(
                self.parameters
                    .iter()
                    .map(|(name, text)| format!("* `{name}` - {text}")),
            );
        }

        if let Some(errors) = &self.errors {
            lines.extend([String::new(), "# Errors".into(), String::new()]);
            lines.extend(errors.iter().cloned());
        }

        lines
    }
}

/// Compact rendering of a type for prose, `Vec<String>` rather than `Vec < String >`.
pub fn type_name(ty: &Type) -> String {
    let raw = quote!(#ty).to_string();
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());

    for (i, &c) in chars.iter().enumerate() {
        if c != ' ' {
            out.push(c);
            continue;
        }
        let prev = out.chars().last();
        let next = chars.get(i + 1).copied();
        let wordy = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
        let keep = matches!(prev, Some(',' | ';'))
            || (wordy(prev) && (wordy(next) || matches!(next, Some('\'' | '[' | '&' | '*'))));
        if keep {
            out.push(' ');
        }
    }
    out
}

fn is_parameters_marker(line: &str) -> bool {
    if let Some(text) = heading(line) {
        return text.eq_ignore_ascii_case("arguments") || text.eq_ignore_ascii_case("parameters");
    }
    bullet(line)
        .map(|rest| rest.trim_end().trim_end_matches(':'))
        .is_some_and(|rest| rest.eq_ignore_ascii_case("parameters"))
}

/// Text of a markdown heading line.
fn heading(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix('#')?;
    Some(rest.trim_start_matches('#').trim())
}

/// Text after a `-` or `*` list marker.
fn bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('*'))
        .map(str::trim_start)
}

/// `* `name` - text`, `- name: text` and the other mixes of the two.
fn parameter_entry(line: &str) -> Option<(String, String)> {
    let rest = bullet(line)?;

    let (name, after) = if let Some(quoted) = rest.strip_prefix('`') {
        let end = quoted.find('`')?;
        (&quoted[..end], &quoted[end + 1..])
    } else {
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '#'))
            .unwrap_or(rest.len());
        (&rest[..end], &rest[end..])
    };

    let name = name.trim();
    let name = name.strip_prefix("r#").unwrap_or(name);
    if name.is_empty() {
        return None;
    }

    let after = after.trim_start();
    let text = after
        .strip_prefix(':')
        .or_else(|| after.strip_prefix('-'))?
        .trim();
    Some((name.to_string(), text.to_string()))
}

fn joined(lines: &[String]) -> Option<String> {
    let text = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn trim_blank(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.trim().is_empty()).count();
    lines.drain(..leading);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::collect::{Collected, Collector};
    use crate::analysis::effect::forwarding;
    use crate::model::Scope;
    use syn::{parse_quote, ItemMod};

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn synthesize(module: ItemMod) -> Documentation {
        let scope = Scope::lower(&module).unwrap();
        let container = scope.find_type("Person").unwrap();
        let bundle = scope.find_type("Arguments").unwrap();
        let forwarding = forwarding(container, "Arguments", &scope);
        let properties = match Collector::new(&scope, "Arguments").collect(bundle).unwrap() {
            Collected::Properties(p) => p,
            Collected::Defaults(_) => Vec::new(),
        };
        Documentation::synthesize(container, bundle, forwarding.as_ref(), &properties)
    }

    #[test]
    fn test_parse_rustdoc_arguments_section() {
        let doc = parse(&lines(
            "Builds a person.\n\
             \n\
             # Arguments\n\
             \n\
             * `name` - Display name,\n\
             \x20 shown in greetings.\n\
             * `age` - Age in years.\n\
             \n\
             # Examples\n\
             * `ignored` - not a parameter",
        ));

        assert_eq!(doc.summary, ["Builds a person."]);
        assert_eq!(doc.parameters.len(), 2);
        assert_eq!(doc.parameters["name"], "Display name, shown in greetings.");
        assert_eq!(doc.parameters["age"], "Age in years.");
    }

    #[test]
    fn test_parse_list_style_parameters() {
        let doc = parse(&lines(
            "Summary line.\n\
             - Parameters:\n\
             \x20 - isAlive: Whether the subject lives.\n\
             \x20 - r#type: The kind\n\
             \x20   of subject.",
        ));

        assert_eq!(doc.summary, ["Summary line."]);
        assert_eq!(doc.parameters["isAlive"], "Whether the subject lives.");
        assert_eq!(doc.parameters["type"], "The kind of subject.");
    }

    #[test]
    fn test_parse_without_marker_is_all_summary() {
        let doc = parse(&lines("First.\n\nSecond.\n"));
        assert_eq!(doc.summary, ["First.", "", "Second."]);
        assert!(doc.parameters.is_empty());
    }

    #[test]
    fn test_summary_stops_at_first_heading() {
        let doc = parse(&lines(
            "Builds a person.\n\
             \n\
             # Examples\n\
             \n\
             ```\n\
             let args = Arguments::with(\"Ada\".into());\n\
             ```\n\
             \n\
             # Arguments\n\
             \n\
             * `name` - Display name.",
        ));

        assert_eq!(doc.summary, ["Builds a person."]);
        assert_eq!(doc.parameters["name"], "Display name.");
    }

    #[test]
    fn test_blank_line_ends_continuation() {
        let doc = parse(&lines("# Parameters\n- a: one\n\nstray prose"));
        assert_eq!(doc.parameters["a"], "one");
    }

    #[test]
    fn test_errors_section_and_throws_line() {
        let section = errors(&lines(
            "Creates it.\n\n# Errors\n\nFails when `is_alive` is false.\n\n# Panics\nNever.",
        ));
        assert_eq!(section, Some(vec!["Fails when `is_alive` is false.".to_string()]));

        let throws = errors(&lines("Creates it.\n- Throws: `ValidationError` when dead."));
        assert_eq!(throws, Some(vec!["`ValidationError` when dead.".to_string()]));

        assert_eq!(errors(&lines("Creates it.")), None);
    }

    #[test]
    fn test_type_name_is_compact() {
        let ty: Type = parse_quote!(std::collections::HashMap<String, Vec<u8>>);
        assert_eq!(type_name(&ty), "std::collections::HashMap<String, Vec<u8>>");

        let ty: Type = parse_quote!(&'static mut [u8; 4]);
        assert_eq!(type_name(&ty), "&'static mut [u8; 4]");

        let ty: Type = parse_quote!(Box<dyn Fn(u8)>);
        assert_eq!(type_name(&ty), "Box<dyn Fn(u8)>");
    }

    #[test]
    fn test_parameter_docs_prefer_bundle_constructor() {
        let doc = synthesize(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person { pub fn new(arguments: Arguments) -> Self { Self { arguments } } }
                pub struct Arguments {
                    /// Field doc for name.
                    pub name: String,
                    /// Field doc for age.
                    pub age: u32,
                    pub tags: Vec<String>,
                }
                impl Arguments {
                    /// Arguments for a person.
                    ///
                    /// # Arguments
                    ///
                    /// * `name` - Constructor doc for name.
                    pub fn with(name: String, age: u32, tags: Vec<String>) -> Self {
                        Self { name, age, tags }
                    }
                }
            }
        });

        assert_eq!(doc.summary, ["Arguments for a person."]);
        assert_eq!(
            doc.parameters,
            [
                ("name".to_string(), "Constructor doc for name.".to_string()),
                ("age".to_string(), "Field doc for age.".to_string()),
                ("tags".to_string(), "A value of type `Vec<String>`.".to_string()),
            ]
        );
        assert_eq!(doc.errors, None);
    }

    #[test]
    fn test_summary_falls_back_to_forwarding_constructor() {
        let doc = synthesize(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person {
                    /// Validates and stores the person.
                    ///
                    /// # Errors
                    ///
                    /// Returns `Invalid` for an empty name.
                    pub fn new(arguments: Arguments) -> Result<Self, Invalid> { todo!() }
                }
                pub struct Arguments { pub name: String }
            }
        });

        assert_eq!(doc.summary, ["Validates and stores the person."]);
        assert_eq!(
            doc.errors,
            Some(vec!["Returns `Invalid` for an empty name.".to_string()])
        );
    }

    #[test]
    fn test_fallbacks_without_any_docs() {
        let doc = synthesize(parse_quote! {
            mod m {
                pub struct Person { arguments: Arguments }
                impl Person { pub fn check(arguments: Arguments) -> Result<Self, Invalid> { todo!() } }
                pub struct Arguments { pub name: String }
            }
        });

        assert_eq!(
            doc.summary,
            ["Creates a `Person` from the individual fields of its `Arguments`."]
        );
        assert_eq!(
            doc.errors,
            Some(vec![
                "Returns an error if `Person::check` rejects the assembled arguments.".to_string()
            ])
        );
        assert_eq!(
            doc.lines(),
            [
                "Creates a `Person` from the individual fields of its `Arguments`.",
                "",
                "# Arguments",
                "",
                "* `name` - A value of type `String`.",
                "",
                "# Errors",
                "",
                "Returns an error if `Person::check` rejects the assembled arguments.",
            ]
        );
    }
}
