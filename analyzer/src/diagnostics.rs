use crate::line_index::LineIndex;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: Option<String>,
}

#[derive(Default, Debug)]
pub struct Diagnostics {
    pub diags: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn emit_error(&mut self, span: Span, message: impl Into<String>) {
        self.emit_error_with_labels(span, message, vec![]);
    }

    pub fn emit_warning(&mut self, span: Span, message: impl Into<String>) {
        self.diags.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            span,
            labels: vec![],
        });
    }

    pub fn emit_error_with_labels(
        &mut self,
        span: Span,
        message: impl Into<String>,
        labels: Vec<Label>,
    ) {
        self.diags.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
            span,
            labels,
        });
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.diags.truncate(len);
    }
}

/// Renders diagnostics sorted by position, with 1-based line and column.
pub fn format_diagnostics(source: &str, mut diags: Vec<Diagnostic>) -> String {
    use std::fmt::Write;

    diags.sort_by(|a, b| {
        (a.span.start, a.span.end, &a.message).cmp(&(b.span.start, b.span.end, &b.message))
    });
    let index = LineIndex::from_source(source);
    let line_col = |pos: u32| {
        index
            .line_col(pos)
            .map(|lc| (lc.line + 1, lc.col + 1))
            .unwrap_or((0, 0))
    };

    let mut out = String::new();

    for d in diags {
        let mut labels = d.labels;
        labels.sort_by(|a, b| {
            (a.span.start, a.span.end, a.message.as_deref().unwrap_or("")).cmp(&(
                b.span.start,
                b.span.end,
                b.message.as_deref().unwrap_or(""),
            ))
        });

        let (line, col) = line_col(d.span.start);
        let _ = writeln!(&mut out, "{}: {}", d.severity.as_str(), d.message);
        let _ = writeln!(
            &mut out,
            "  --> <input>:{}:{} [{}..{}]",
            line, col, d.span.start, d.span.end
        );
        for label in labels {
            let (line, col) = line_col(label.span.start);
            let _ = writeln!(
                &mut out,
                "  = label: {}:{} [{}..{}] {}",
                line,
                col,
                label.span.start,
                label.span.end,
                label.message.unwrap_or_default()
            );
        }
    }
    out
}
