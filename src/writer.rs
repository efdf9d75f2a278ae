// TopoCfg: Router configuration synthesis written in Rust
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Indentation-tracking text accumulator that renders nested configuration blocks into flat,
//! vendor-formatted lines.

use std::{
    fmt::Display,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{config::GeneratorConfig, types::ConfigGenError};

/// Line that closes a configuration block.
pub const BLOCK_TERMINATOR: &str = "!";

/// File extension of all generated configuration files.
pub const CONFIG_EXTENSION: &str = "conf";

/// How [`ConfigWriter::write`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WriteMode {
    /// Replace the content of the file.
    #[default]
    Overwrite,
    /// Add the new content at the end of the file. Used when multiple generation passes target
    /// the same node.
    Append,
}

/// Accumulates configuration lines at a current nesting depth. Every line is prefixed with the
/// indentation string once per depth level. Closing a block with [`ConfigWriter::unindent`]
/// emits the block terminator `!` at the new (shallower) depth.
///
/// ```
/// # use topocfg::writer::ConfigWriter;
/// let mut w = ConfigWriter::new();
/// w.add("router isis core")
///     .indent()
///     .add("address-family ipv4 unicast")
///     .indent()
///     .add("metric-style wide")
///     .unindent()
///     .unindent();
/// assert_eq!(
///     w.build().unwrap(),
///     "\
/// router isis core
///  address-family ipv4 unicast
///   metric-style wide
///  !
/// !"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWriter {
    indent: String,
    lines: Vec<String>,
    depth: usize,
}

impl Default for ConfigWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigWriter {
    /// Create an empty writer that indents with a single space.
    pub fn new() -> Self {
        Self::with_indent(" ")
    }

    /// Create an empty writer with a custom indentation string.
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            lines: Vec::new(),
            depth: 0,
        }
    }

    /// Create an empty writer using the indentation of the generator configuration.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::with_indent(config.indent.as_str())
    }

    /// Append a single line at the current depth. Empty lines are dropped.
    pub fn add(&mut self, line: impl AsRef<str>) -> &mut Self {
        let line = line.as_ref();
        if !line.is_empty() {
            self.push(line);
        }
        self
    }

    /// Append each line at the current depth, dropping empty lines. Since `Option` is iterable,
    /// this also adds conditional lines:
    ///
    /// ```
    /// # use topocfg::writer::ConfigWriter;
    /// let description: Option<String> = None;
    /// let mut w = ConfigWriter::new();
    /// w.add_all(["interface Loopback 0", ""])
    ///     .add_all(description.map(|d| format!("description {d}")));
    /// assert_eq!(w.to_string(), "interface Loopback 0");
    /// ```
    pub fn add_all<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.add(line);
        }
        self
    }

    /// Open a nested block. Nothing is emitted.
    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    /// Close the innermost block and emit the terminator at the parent depth. Does nothing if no
    /// block is open.
    pub fn unindent(&mut self) -> &mut Self {
        if self.depth > 0 {
            self.depth -= 1;
            self.push(BLOCK_TERMINATOR);
        }
        self
    }

    /// Close all open blocks, such that the next line starts a new top-level section.
    pub fn line_return(&mut self) -> &mut Self {
        while self.depth > 0 {
            self.unindent();
        }
        self
    }

    /// Remove all lines and reset the depth, such that the writer can be reused.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.depth = 0;
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// All lines added so far, including their indentation.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns `true` if no line was added.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join all lines with newlines. Returns `ConfigGenError::UnbalancedBlock` if some block is
    /// still open.
    pub fn build(&self) -> Result<String, ConfigGenError> {
        if self.depth != 0 {
            return Err(ConfigGenError::UnbalancedBlock(self.depth));
        }
        Ok(self.to_string())
    }

    /// Write the configuration to `<dir>/<name>.conf`, and return the path of the file. The file
    /// ends with a newline, such that a later pass in `WriteMode::Append` starts on a new line.
    pub fn write(
        &self,
        dir: impl AsRef<Path>,
        name: &str,
        mode: WriteMode,
    ) -> Result<PathBuf, ConfigGenError> {
        let mut config = self.build()?;
        if !config.is_empty() {
            config.push('\n');
        }
        let path = dir.as_ref().join(format!("{name}.{CONFIG_EXTENSION}"));
        write_file(&path, &config, mode)?;
        Ok(path)
    }

    fn push(&mut self, line: &str) {
        let mut s = self.indent.repeat(self.depth);
        s.push_str(line);
        self.lines.push(s);
    }
}

/// Write `content` to `path` according to `mode`.
pub(crate) fn write_file(path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()> {
    let mut file = match mode {
        WriteMode::Overwrite => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(path)?,
    };
    file.write_all(content.as_bytes())?;
    log::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

impl Display for ConfigWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_str_eq;

    #[test]
    fn drops_empty_lines() {
        let mut w = ConfigWriter::new();
        w.add("").add("hostname r1").add_all(["", "cdp", ""]);
        assert_eq!(w.lines(), ["hostname r1", "cdp"]);
    }

    #[test]
    fn indent_emits_nothing() {
        let mut w = ConfigWriter::new();
        w.indent().indent();
        assert!(w.is_empty());
        assert_eq!(w.depth(), 2);
        w.add("x");
        assert_eq!(w.lines(), ["  x"]);
    }

    #[test]
    fn terminator_at_parent_depth() {
        let mut w = ConfigWriter::new();
        w.add("a").indent().add("b").indent().add("c").unindent().add("d");
        w.unindent();
        assert_str_eq!(w.build().unwrap(), "a\n b\n  c\n !\n d\n!");
    }

    #[test]
    fn unindent_at_top_level_is_noop() {
        let mut w = ConfigWriter::new();
        w.add("a").unindent().unindent();
        assert_eq!(w.lines(), ["a"]);
        assert_eq!(w.depth(), 0);
    }

    #[test]
    fn one_terminator_per_unindent() {
        let mut w = ConfigWriter::new();
        let mut unindents = 0;
        for i in 0..5 {
            w.add(format!("block {i}"));
            for _ in 0..=i {
                w.indent().add("line");
            }
            for _ in 0..=i {
                w.unindent();
                unindents += 1;
            }
        }
        let terminators = w.lines().iter().filter(|l| l.trim() == "!").count();
        assert_eq!(terminators, unindents);
        assert_eq!(w.depth(), 0);
    }

    #[test]
    fn line_return_closes_everything() {
        let mut w = ConfigWriter::new();
        w.add("a").indent().add("b").indent().add("c").indent();
        assert_eq!(w.depth(), 3);
        w.line_return();
        assert_eq!(w.depth(), 0);
        assert_str_eq!(w.build().unwrap(), "a\n b\n  c\n  !\n !\n!");
        // a second line return has no effect
        w.line_return();
        assert_eq!(w.lines().len(), 6);
    }

    #[test]
    fn unbalanced() {
        let mut w = ConfigWriter::new();
        w.add("router bgp 10").indent().add("bgp router-id 1.1.1.1");
        assert!(matches!(w.build(), Err(ConfigGenError::UnbalancedBlock(1))));
        w.unindent();
        assert!(w.build().is_ok());
    }

    #[test]
    fn reset() {
        let mut w = ConfigWriter::new();
        w.add("a").indent().add("b");
        w.reset();
        assert!(w.is_empty());
        assert_eq!(w.depth(), 0);
        w.add("c");
        assert_eq!(w.to_string(), "c");
    }

    #[test]
    fn custom_indent() {
        let mut w = ConfigWriter::with_indent("\t");
        w.add("a").indent().add("b").unindent();
        assert_str_eq!(w.to_string(), "a\n\tb\n!");
        let mut w = ConfigWriter::from_config(&GeneratorConfig {
            indent: String::from("  "),
            ..Default::default()
        });
        w.indent().add("b").unindent();
        assert_str_eq!(w.to_string(), "  b\n!");
    }

    #[test]
    fn write_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ConfigWriter::new();
        w.add("hostname r1");
        let path = w.write(dir.path(), "r1", WriteMode::Overwrite).unwrap();
        assert_eq!(path, dir.path().join("r1.conf"));

        w.reset();
        w.add("router isis core").indent().add("is-type level-2-only").unindent();
        w.write(dir.path(), "r1", WriteMode::Append).unwrap();
        assert_str_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "hostname r1\nrouter isis core\n is-type level-2-only\n!\n"
        );

        w.write(dir.path(), "r1", WriteMode::Overwrite).unwrap();
        assert_str_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "router isis core\n is-type level-2-only\n!\n"
        );
    }

    #[test]
    fn write_unbalanced_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ConfigWriter::new();
        w.add("a").indent();
        assert!(w.write(dir.path(), "r1", WriteMode::Overwrite).is_err());
        assert!(!dir.path().join("r1.conf").exists());
    }
}
