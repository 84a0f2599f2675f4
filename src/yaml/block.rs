//! Cutting the lines of a block mapping into one [`Block`] per key.
//!
//! Comments and blank lines between two keys are shared out the way a
//! reader sees them: comments indented deeper than the keys close the value
//! above, everything else introduces the key below. Blank lines that end a
//! keep-chomped block scalar (`|+`, `>+`) are part of its value and stay with
//! it.

use super::ParseError;

/// One key of a mapping with the lines that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// The key as written, without quotes.
    pub name: String,
    /// Comment and blank lines above the key line.
    pub head: Vec<String>,
    /// The key line, the value lines and any deeper comments closing them.
    pub body: Vec<String>,
}

impl Block {
    pub fn key_line(&self) -> &str {
        self.body.first().map_or("", String::as_str)
    }

    pub fn has_head_comment(&self) -> bool {
        self.head.iter().any(|l| is_comment(l))
    }

    /// Prepend a blank line to the head unless one is already there.
    pub fn ensure_leading_blank_line(&mut self) {
        if self.head.first().is_none_or(|l| !l.trim().is_empty()) {
            self.head.insert(0, String::new());
        }
    }

    pub fn trim_leading_blank_lines(&mut self) {
        let blanks = self.head.iter().take_while(|l| l.trim().is_empty()).count();
        self.head.drain(..blanks);
    }

    pub fn keeps_trailing_blanks(&self) -> bool {
        keeps_trailing_blanks(&self.body)
    }

    /// Remove up to `by` leading spaces from every line.
    pub fn dedent(&mut self, by: usize) {
        for line in self.head.iter_mut().chain(self.body.iter_mut()) {
            let strip = indent_of(line).min(by);
            line.drain(..strip);
        }
    }

    /// Head followed by body.
    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.head.iter().chain(self.body.iter())
    }
}

/// The blocks of one mapping plus the lines around them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Blocks {
    /// Indentation of the key lines.
    pub indent: usize,
    /// Directives and `---` before the first key.
    pub lead: Vec<String>,
    pub blocks: Vec<Block>,
    /// Lines after the last block: shallow comments, blank lines, `...`.
    pub trail: Vec<String>,
}

impl Blocks {
    pub fn position(&self, name: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.name == name)
    }

    pub fn into_lines(self) -> Vec<String> {
        let mut out = self.lead;
        for block in self.blocks {
            out.extend(block.head);
            out.extend(block.body);
        }
        out.extend(self.trail);
        out
    }
}

/// Cut `lines` into `count` blocks whose key lines sit at `indent`.
///
/// `count` comes from the parsed value, so a mismatch means a key line could
/// not be recognized and is reported rather than guessed around.
pub fn split_blocks(lines: &[String], indent: usize, count: usize) -> Result<Blocks, ParseError> {
    let starts: Vec<(usize, String)> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| indent_of(l) == indent && !is_marker(l))
        .filter_map(|(i, l)| split_key(&l[indent..]).map(|(name, _)| (i, name)))
        .collect();
    if starts.len() != count {
        return Err(ParseError {
            line: None,
            message: format!(
                "expected {count} keys at indentation {indent}, recognized {}",
                starts.len()
            ),
        });
    }

    let mut out = Blocks {
        indent,
        ..Blocks::default()
    };
    let Some(&(first, _)) = starts.first() else {
        out.lead = lines.to_vec();
        return Ok(out);
    };
    let lead_end = lines[..first]
        .iter()
        .rposition(|l| is_marker(l))
        .map_or(0, |i| i + 1);
    out.lead = lines[..lead_end].to_vec();

    let mut head = lines[lead_end..first].to_vec();
    for (n, (start, name)) in starts.iter().enumerate() {
        let end = starts.get(n + 1).map_or(lines.len(), |(next, _)| *next);
        let (body, rest) = take_body(&lines[*start..end], indent);
        out.blocks.push(Block {
            name: name.clone(),
            head: std::mem::take(&mut head),
            body: body.to_vec(),
        });
        head = rest.to_vec();
    }
    out.trail = head;
    Ok(out)
}

/// Split the lines from a key line up to the next key into the key's body
/// and the lines that belong to whatever follows.
fn take_body(region: &[String], indent: usize) -> (&[String], &[String]) {
    let mut end = region.iter().rposition(|l| is_content(l)).map_or(0, |i| i + 1);
    if keeps_trailing_blanks(&region[..end]) {
        end += region[end..]
            .iter()
            .take_while(|l| l.trim().is_empty())
            .count();
    }
    let tail = &region[end..];
    let run = tail
        .iter()
        .take_while(|l| l.trim().is_empty() || (is_comment(l) && indent_of(l) > indent))
        .count();
    end += tail[..run]
        .iter()
        .rposition(|l| is_comment(l))
        .map_or(0, |i| i + 1);
    region.split_at(end)
}

/// True when the last value line of `lines` belongs to a block scalar with
/// a `+` chomping indicator, so blank lines after it are part of the value.
pub fn keeps_trailing_blanks<S: AsRef<str>>(lines: &[S]) -> bool {
    let Some(last) = lines.iter().rposition(|l| !l.as_ref().trim().is_empty()) else {
        return false;
    };
    let mut shallowest = usize::MAX;
    for line in lines[..=last].iter().rev() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let indent = indent_of(line);
        if let Some(keep) = block_scalar_header(line) {
            if shallowest > indent {
                return keep;
            }
        }
        shallowest = shallowest.min(indent);
    }
    false
}

/// `Some(keep)` when `line` ends with a block scalar header such as `|`,
/// `>-` or `|+2`.
fn block_scalar_header(line: &str) -> Option<bool> {
    let code = line.find(" #").map_or(line, |i| &line[..i]).trim_end();
    let (before, indicator) = code.rsplit_once(' ')?;
    let mut chars = indicator.chars();
    if !matches!(chars.next(), Some('|' | '>')) {
        return None;
    }
    if !chars.all(|c| c == '+' || c == '-' || c.is_ascii_digit()) {
        return None;
    }
    let before = before.trim_end();
    let opens = before.ends_with(':')
        || before.ends_with('-')
        || before
            .rsplit(' ')
            .next()
            .is_some_and(|t| t.starts_with('!') || t.starts_with('&'));
    opens.then(|| indicator.contains('+'))
}

/// The key of a `key: value` text (indentation already removed) and the byte
/// offset just past its colon.
fn split_key(text: &str) -> Option<(String, usize)> {
    let quote = text.chars().next()?;
    if quote == '"' || quote == '\'' {
        let close = closing_quote(text, quote)?;
        let rest = text[close + 1..].strip_prefix(':')?;
        if !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
            return None;
        }
        let inner = &text[1..close];
        let name = if quote == '"' {
            inner.replace("\\\"", "\"").replace("\\\\", "\\")
        } else {
            inner.replace("''", "'")
        };
        return Some((name, close + 2));
    }
    if text.starts_with(['#', '[', '{', '&', '*', '!', '|', '>', '?', '%'])
        || text == "-"
        || text.starts_with("- ")
    {
        return None;
    }

    let mut from = 0;
    while let Some(offset) = text[from..].find(':') {
        let colon = from + offset;
        let next = text[colon + 1..].chars().next();
        if next.is_none_or(|c| c == ' ' || c == '\t') {
            let key = text[..colon].trim_end();
            if key.is_empty() || key.contains(" #") {
                return None;
            }
            return Some((key.to_string(), colon + 1));
        }
        from = colon + 1;
    }
    None
}

fn closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
        } else if c == quote {
            if quote == '\'' && chars.peek().is_some_and(|(_, n)| *n == '\'') {
                chars.next();
                continue;
            }
            return Some(i);
        }
    }
    None
}

/// The text after the colon of a key line, trimmed. `None` for lines that
/// are not key lines.
pub fn inline_value(line: &str) -> Option<&str> {
    let indent = indent_of(line);
    let (_, colon) = split_key(&line[indent..])?;
    Some(line[indent + colon..].trim())
}

/// A key line with any inline value removed. Comments, anchors and tags
/// after the colon are kept.
pub fn bare_key_line(line: &str) -> String {
    let indent = indent_of(line);
    match split_key(&line[indent..]) {
        Some((_, colon)) => {
            let rest = line[indent + colon..].trim();
            if rest.is_empty() || rest.starts_with(['#', '&', '!']) {
                line.trim_end().to_string()
            } else {
                line[..indent + colon].to_string()
            }
        }
        None => line.trim_end().to_string(),
    }
}

/// Indentation of the first line that holds a value.
pub fn content_indent<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .find(|l| is_content(l))
        .map(indent_of)
}

pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn is_marker(line: &str) -> bool {
    line.starts_with('%')
        || ["---", "..."].iter().any(|m| {
            line.strip_prefix(m)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
        })
}

fn is_content(line: &str) -> bool {
    !line.trim().is_empty() && !is_comment(line) && !is_marker(line)
}
