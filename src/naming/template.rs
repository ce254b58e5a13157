//! The naming template language.
//!
//! A template is literal text mixed with variable references (`{name}`)
//! and optional segments (`{prefix {name} suffix}`) that vanish entirely
//! when their variable has no value. Templates come from configuration,
//! so [`TemplateResolver::validate`] exists separately from evaluation:
//! a bad template must be rejected before anything touches the
//! filesystem.

use std::collections::HashMap;

use thiserror::Error;

/// Folder naming template used when nothing else is configured.
pub const DEFAULT_TEMPLATE: &str = "{[{date}] }{albumname}{ [{catalog}]}{ [{format}]}";
/// Catalog number leads, common for doujin/label-sorted collections.
pub const CATALOG_FIRST_TEMPLATE: &str = "{[{catalog}] }{albumname}{ [{date}]}{ [{format}]}";
/// Variants that keep the existing folder name instead of the album tag.
pub const SAME_FOLDER_NAME_TEMPLATE: &str = "{[{date}] }{foldername}{ [{catalog}]}{ [{format}]}";
pub const SAME_FOLDER_NAME_CATALOG_FIRST_TEMPLATE: &str =
    "{[{catalog}] }{foldername}{ [{date}]}{ [{format}]}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unbalanced braces in template (byte {0})")]
    UnbalancedBraces(usize),
    #[error("optional segments cannot contain other optional segments (byte {0})")]
    NestedOptionalSegment(usize),
    #[error("malformed template segment `{0}`")]
    MalformedSegment(String),
    #[error("unknown template variable `{0}`")]
    UnknownVariable(String),
}

/// Variable name → optional value. A missing key is an error at
/// evaluation time; a `None` (or empty) value renders as nothing.
pub type TemplateBindings = HashMap<String, Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Literal(String),
    Variable(String),
    Optional {
        prefix: String,
        variable: String,
        suffix: String,
    },
}

/// Evaluates naming templates against a set of bindings.
pub struct TemplateResolver {
    bindings: TemplateBindings,
}

impl TemplateResolver {
    pub fn new(bindings: TemplateBindings) -> Self {
        TemplateResolver { bindings }
    }

    /// Checks a template for syntax errors without evaluating it.
    pub fn validate(template: &str) -> Result<(), TemplateError> {
        parse(template).map(|_| ())
    }

    /// Renders a template in one left-to-right pass. Optional segments
    /// evaluate independently to either nothing or their rendered
    /// content.
    pub fn evaluate(&self, template: &str) -> Result<String, TemplateError> {
        let mut output = String::new();
        for node in parse(template)? {
            match node {
                Node::Literal(text) => output.push_str(&text),
                Node::Variable(name) => output.push_str(self.lookup(&name)?),
                Node::Optional {
                    prefix,
                    variable,
                    suffix,
                } => {
                    let value = self.lookup(&variable)?;
                    if !value.is_empty() {
                        output.push_str(&prefix);
                        output.push_str(value);
                        output.push_str(&suffix);
                    }
                }
            }
        }
        Ok(output)
    }

    fn lookup(&self, name: &str) -> Result<&str, TemplateError> {
        match self.bindings.get(name) {
            Some(Some(value)) => Ok(value.as_str()),
            Some(None) => Ok(""),
            None => Err(TemplateError::UnknownVariable(name.to_string())),
        }
    }
}

/// Picks the folder naming template: a validated custom one when given,
/// otherwise one of the built-ins.
pub fn folder_naming_template(
    custom: Option<&str>,
    catalog_first: bool,
    same_folder_name: bool,
) -> Result<String, TemplateError> {
    if let Some(template) = custom {
        TemplateResolver::validate(template)?;
        return Ok(template.to_string());
    }
    Ok(match (catalog_first, same_folder_name) {
        (true, true) => SAME_FOLDER_NAME_CATALOG_FIRST_TEMPLATE,
        (true, false) => CATALOG_FIRST_TEMPLATE,
        (false, true) => SAME_FOLDER_NAME_TEMPLATE,
        (false, false) => DEFAULT_TEMPLATE,
    }
    .to_string())
}

fn parse(template: &str) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices();
    while let Some((pos, c)) = chars.next() {
        match c {
            '}' => return Err(TemplateError::UnbalancedBraces(pos)),
            '{' => {
                if !literal.is_empty() {
                    nodes.push(Node::Literal(std::mem::take(&mut literal)));
                }
                nodes.push(parse_group(&mut chars, pos)?);
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        nodes.push(Node::Literal(literal));
    }
    Ok(nodes)
}

/// Parses one `{...}` group after its opening brace: either a plain
/// variable reference or an optional segment with exactly one inner
/// variable.
fn parse_group(
    chars: &mut std::str::CharIndices<'_>,
    open_pos: usize,
) -> Result<Node, TemplateError> {
    let mut prefix = String::new();
    let mut inner: Option<String> = None;
    let mut suffix = String::new();
    loop {
        let Some((pos, c)) = chars.next() else {
            return Err(TemplateError::UnbalancedBraces(open_pos));
        };
        match c {
            '}' => break,
            '{' => {
                if inner.is_some() {
                    // a second variable in one segment
                    return Err(TemplateError::MalformedSegment(format!(
                        "{}{{…}}{}",
                        prefix, suffix
                    )));
                }
                inner = Some(parse_inner_variable(chars, pos)?);
            }
            _ => {
                if inner.is_none() {
                    prefix.push(c);
                } else {
                    suffix.push(c);
                }
            }
        }
    }
    match inner {
        None => Ok(Node::Variable(checked_name(prefix)?)),
        Some(variable) => Ok(Node::Optional {
            prefix,
            variable: checked_name(variable)?,
            suffix,
        }),
    }
}

fn parse_inner_variable(
    chars: &mut std::str::CharIndices<'_>,
    open_pos: usize,
) -> Result<String, TemplateError> {
    let mut name = String::new();
    loop {
        let Some((pos, c)) = chars.next() else {
            return Err(TemplateError::UnbalancedBraces(open_pos));
        };
        match c {
            '}' => return Ok(name),
            '{' => return Err(TemplateError::NestedOptionalSegment(pos)),
            _ => name.push(c),
        }
    }
}

fn checked_name(name: String) -> Result<String, TemplateError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(TemplateError::MalformedSegment(name))
    }
}
