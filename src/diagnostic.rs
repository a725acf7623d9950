//! Compiler-style rendering of parse errors: severity header, file locus,
//! the offending source line with a caret under the column, and optional
//! notes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            line,
            column,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();

        let severity = match diagnostic.severity {
            Severity::Error => self.style_red_bold("error"),
            Severity::Warning => self.style_yellow_bold("warning"),
        };
        out.push_str(&format!(
            "{}: {}\n",
            severity,
            self.style_bold(&diagnostic.message)
        ));
        out.push_str(&format!(
            "  {} {}:{}:{}\n",
            self.style_blue("-->"),
            self.file_name,
            diagnostic.line,
            diagnostic.column
        ));

        if let Some(line) = self.source.lines().nth(diagnostic.line.saturating_sub(1)) {
            let line_number = diagnostic.line.to_string();
            let gutter = " ".repeat(line_number.len());
            out.push_str(&format!("{} {}\n", gutter, self.style_blue("|")));
            out.push_str(&format!(
                "{} {} {}\n",
                self.style_blue(&line_number),
                self.style_blue("|"),
                line
            ));
            let caret_pad = " ".repeat(diagnostic.column.saturating_sub(1));
            out.push_str(&format!(
                "{} {} {}{}\n",
                gutter,
                self.style_blue("|"),
                caret_pad,
                self.style_red("^")
            ));
        }

        for note in &diagnostic.notes {
            out.push_str(&format!("  {} {}\n", self.style_blue("="), note));
        }

        out
    }

    fn style_red(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[31m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_red_bold(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[1;31m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_yellow_bold(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[1;33m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_blue(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[34m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_bold(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[1m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }
}

/// Renders a batch of diagnostics followed by an error-count summary.
pub fn render_diagnostics(
    source: &str,
    file_name: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut out = String::new();
    for diagnostic in diagnostics {
        out.push_str(&renderer.render(diagnostic));
        out.push('\n');
    }

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if error_count > 0 {
        out.push_str(&format!(
            "error: aborting due to {} parse error{}\n",
            error_count,
            if error_count == 1 { "" } else { "s" }
        ));
    }
    out
}
