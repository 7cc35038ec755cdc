/// A single input line split into its command name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub command: String,
    pub arguments: Vec<String>,
}

/// Splits raw input on whitespace. No quoting or escaping is recognised.
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(String::from).collect()
}

/// Returns `None` for empty or whitespace-only lines, which must not be
/// recorded or dispatched.
pub fn parse_line(input: &str) -> Option<ParsedLine> {
    let mut tokens = tokenize(input).into_iter();
    let command = tokens.next()?;

    Some(ParsedLine {
        command,
        arguments: tokens.collect(),
    })
}
