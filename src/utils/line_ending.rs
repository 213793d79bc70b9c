use crate::config::EndOfLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Crlf,
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// Target ending for an `endOfLine` preference; `auto` keeps what the
    /// document already uses most.
    pub fn resolve(preference: EndOfLine, content: &str) -> Self {
        match preference {
            EndOfLine::Lf => LineEnding::Lf,
            EndOfLine::Crlf => LineEnding::Crlf,
            EndOfLine::Cr => LineEnding::Cr,
            EndOfLine::Auto => detect_line_ending(content),
        }
    }
}

/// Dominant line ending of `content`, LF when there are none.
pub fn detect_line_ending(content: &str) -> LineEnding {
    let crlf = content.matches("\r\n").count();
    let lf = content.matches('\n').count() - crlf;
    let cr = content.matches('\r').count() - crlf;

    if crlf > lf && crlf >= cr {
        LineEnding::Crlf
    } else if cr > lf && cr > crlf {
        LineEnding::Cr
    } else {
        LineEnding::Lf
    }
}

/// Convert every line ending in `content` to LF.
pub fn to_lf(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Rewrite all line endings in `content` to `target`.
pub fn normalize_line_ending(content: &str, target: LineEnding) -> String {
    let lf = to_lf(content);
    match target {
        LineEnding::Lf => lf,
        other => lf.replace('\n', other.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_line_ending() {
        assert_eq!(detect_line_ending("hello\nworld"), LineEnding::Lf);
        assert_eq!(detect_line_ending("hello\r\nworld\r\n"), LineEnding::Crlf);
        assert_eq!(detect_line_ending("a\r\nb\nc\n"), LineEnding::Lf);
        assert_eq!(detect_line_ending("a\rb\r"), LineEnding::Cr);
        assert_eq!(detect_line_ending("no line endings"), LineEnding::Lf);
    }

    #[test]
    fn test_normalize_line_ending() {
        assert_eq!(normalize_line_ending("a\r\nb\nc", LineEnding::Lf), "a\nb\nc");
        assert_eq!(normalize_line_ending("a\nb\r\n", LineEnding::Crlf), "a\r\nb\r\n");
        assert_eq!(normalize_line_ending("a\nb", LineEnding::Cr), "a\rb");
    }

    #[test]
    fn test_resolve_auto() {
        assert_eq!(LineEnding::resolve(EndOfLine::Auto, "a\r\nb\r\n"), LineEnding::Crlf);
        assert_eq!(LineEnding::resolve(EndOfLine::Crlf, "a\nb\n"), LineEnding::Crlf);
    }
}
