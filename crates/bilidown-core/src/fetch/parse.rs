//! Parse HTTP response header lines into a ResponseHead.

/// Status and length of the final response seen on a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status: Option<u32>,
    pub content_length: Option<u64>,
}

/// Collects raw header lines as curl delivers them. A new status line starts a
/// new block, so after redirects only the final response remains.
#[derive(Debug, Default)]
pub(crate) struct HeaderBlock {
    lines: Vec<String>,
}

impl HeaderBlock {
    pub fn push(&mut self, raw: &[u8]) {
        let Ok(s) = std::str::from_utf8(raw) else {
            return;
        };
        let line = s.trim_end();
        if line.starts_with("HTTP/") {
            self.lines.clear();
        }
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
    }

    pub fn head(&self) -> ResponseHead {
        parse_head(&self.lines)
    }
}

/// Parse collected header lines into ResponseHead.
pub(crate) fn parse_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head.status = line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse::<u32>().ok());
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                head.content_length = value.trim().parse::<u64>().ok();
            }
        }
    }

    head
}
