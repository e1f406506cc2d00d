use regex::Regex;

/// Pure transform applied to an authentication name before or after realm
/// selection. Rewriters chain in registration order; each receives the
/// previous rewriter's output.
pub trait NameRewriter: Send + Sync {
    fn rewrite_name(&self, name: &str) -> String;
}

impl<F> NameRewriter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn rewrite_name(&self, name: &str) -> String {
        self(name)
    }
}

/// Regex find/replace rewriter, e.g. stripping an `@domain` suffix or
/// normalizing separators.
pub struct PatternRewriter {
    pattern: Regex,
    replacement: String,
    replace_all: bool,
}

impl PatternRewriter {
    /// Replace the first match only.
    pub fn new(pattern: Regex, replacement: &str) -> Self {
        PatternRewriter { pattern, replacement: replacement.to_string(), replace_all: false }
    }

    /// Replace every match.
    pub fn replace_all(pattern: Regex, replacement: &str) -> Self {
        PatternRewriter { pattern, replacement: replacement.to_string(), replace_all: true }
    }
}

impl NameRewriter for PatternRewriter {
    fn rewrite_name(&self, name: &str) -> String {
        if self.replace_all {
            self.pattern.replace_all(name, self.replacement.as_str()).into_owned()
        } else {
            self.pattern.replace(name, self.replacement.as_str()).into_owned()
        }
    }
}
