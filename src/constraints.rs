//! Loader for predefined external-function constraints.
//!
//! Analyses of stripped binaries attach hand-written constraints to calls of
//! library functions the interpreter does not model. They come from a plain
//! text file with one constraint per line:
//!
//! ```text
//! <function-name><whitespace><constraint-expression>
//! ```
//!
//! Blank lines are ignored, tabs count as spaces, and a function may appear
//! on several lines; its constraints are kept in file order. The expression
//! text is opaque at this layer and is returned verbatim (trimmed).
//!
//! # Example
//!
//! ```rust
//! use concolic_sym::PredefinedConstraints;
//!
//! let constraints = PredefinedConstraints::parse("malloc  rax != 0\nfoo\tx > 3\nfoo y < 2\n")?;
//! assert_eq!(constraints.get("malloc"), Some(&["rax != 0".to_string()][..]));
//! assert_eq!(constraints.get("foo").map(<[String]>::len), Some(2));
//! # Ok::<(), concolic_sym::Error>(())
//! ```

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use log::debug;

use crate::{Error, Result};

/// Constraint expressions keyed by external-function name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredefinedConstraints {
    entries: BTreeMap<String, Vec<String>>,
}

impl PredefinedConstraints {
    /// Creates an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses constraints from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConfig`] for a non-blank line without an
    /// expression part.
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parses constraints from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedConfig`] for a non-blank line without an
    /// expression part, or [`Error::FileError`] if reading fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut constraints = Self::new();
        for (index, line) in reader.lines().enumerate() {
            constraints.parse_line(index + 1, &line?)?;
        }
        debug!(
            "loaded {} predefined constraints for {} functions",
            constraints.entries.values().map(Vec::len).sum::<usize>(),
            constraints.entries.len()
        );
        Ok(constraints)
    }

    /// Loads constraints from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileError`] if the file cannot be read, or
    /// [`Error::MalformedConfig`] for a malformed line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn parse_line(&mut self, line_number: usize, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let line = line.replace('\t', " ");
        let Some((name, expression)) = line.split_once(' ') else {
            return Err(malformed_config!(
                line_number,
                "`{}` has no constraint expression",
                line
            ));
        };
        let (name, expression) = (name.trim(), expression.trim());
        if expression.is_empty() {
            return Err(malformed_config!(
                line_number,
                "`{}` has no constraint expression",
                name
            ));
        }
        self.add(name, expression);
        Ok(())
    }

    /// Appends a constraint for `function`.
    pub fn add(&mut self, function: impl Into<String>, expression: impl Into<String>) {
        self.entries
            .entry(function.into())
            .or_default()
            .push(expression.into());
    }

    /// Returns the constraints of `function` in file order.
    #[must_use]
    pub fn get(&self, function: &str) -> Option<&[String]> {
        self.entries.get(function).map(Vec::as_slice)
    }

    /// Checks if any constraint is attached to `function`.
    #[must_use]
    pub fn contains(&self, function: &str) -> bool {
        self.entries.contains_key(function)
    }

    /// Returns the number of functions with constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if no constraints were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(function, constraints)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, exprs)| (name.as_str(), exprs.as_slice()))
    }
}

impl FromStr for PredefinedConstraints {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_example() {
        let constraints = PredefinedConstraints::parse("foo\tx > 3\nfoo y < 2\n").unwrap();
        assert_eq!(
            constraints.get("foo"),
            Some(&["x > 3".to_string(), "y < 2".to_string()][..])
        );
        assert_eq!(constraints.len(), 1);
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let text = "\n   \n  bar    rdi   ==  0  \r\n\t\nbaz\t\trax >= 1\n";
        let constraints = PredefinedConstraints::parse(text).unwrap();
        assert_eq!(constraints.get("bar"), Some(&["rdi   ==  0".to_string()][..]));
        assert_eq!(constraints.get("baz"), Some(&["rax >= 1".to_string()][..]));
        assert!(!constraints.contains("qux"));
    }

    #[test]
    fn test_missing_expression() {
        let result = PredefinedConstraints::parse("ok a == b\n\nlonely\n");
        match result {
            Err(Error::MalformedConfig { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("lonely"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_iteration_in_name_order() {
        let constraints: PredefinedConstraints = "zeta a\nalpha b\nmid c\n".parse().unwrap();
        let names: Vec<&str> = constraints.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!(
            "concolic-sym-constraints-{}.txt",
            std::process::id()
        ));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "read rax <= 0x100").unwrap();
        }
        let constraints = PredefinedConstraints::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(constraints.get("read"), Some(&["rax <= 0x100".to_string()][..]));

        assert!(matches!(
            PredefinedConstraints::from_file(path),
            Err(Error::FileError(_))
        ));
    }
}
