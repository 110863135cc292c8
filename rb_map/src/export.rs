//! Line based text dump of a map and best-effort reload.
//!
//! Every entry is one `<key> <value>\n` line, written with [`Display`] and read back
//! with [`FromStr`]. By default tokens are escaped so that text containing
//! whitespace survives the round trip:
//!
//! | text                  | escape     |
//! |-----------------------|------------|
//! | `\`                   | `\\`       |
//! | space                 | `\s`       |
//! | tab, LF, CR, FF       | `\t` `\n` `\r` `\f` |
//! | other whitespace      | `\u{a0}`   |
//! | the empty token       | `\e`       |

use std::borrow::Cow;
use std::fmt::Display;
use std::io::{self, BufRead, BufWriter, Write};
use std::str::FromStr;

use log::debug;

use crate::map::RbMap;

/// Settings of [`RbMap::export_with`] and [`RbMap::import_with`].
///
/// Both sides of a round trip must use the same `escape` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Traversal used by [`RbMap::export_with`]. Import accepts either order.
    pub order: Order,
    /// Escape whitespace and backslashes inside tokens. When off, the output is
    /// the plain legacy format and a key or value whose text contains whitespace
    /// will not parse back.
    pub escape: bool,
}

impl Format {
    /// Preorder without escaping.
    pub const fn raw() -> Self {
        Self {
            order: Order::Preorder,
            escape: false,
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Self {
            order: Order::Preorder,
            escape: true,
        }
    }
}

/// Order in which entries are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Node before its subtrees, see [`RbMap::preorder`].
    #[default]
    Preorder,
    /// Ascending key order.
    Inorder,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Entries added to the map.
    pub inserted: usize,
    /// Well formed lines whose key was already present. The stored value is kept.
    pub duplicates: usize,
    /// 1-based number of the first malformed line, where reading stopped.
    pub stopped_at: Option<usize>,
}

impl ImportReport {
    /// `true` if every line was read.
    pub fn is_complete(&self) -> bool {
        self.stopped_at.is_none()
    }
}

impl<K, V> RbMap<K, V>
where
    K: Display,
    V: Display,
{
    /// Writes every entry with [`Format::default`]. See [`export_with`](Self::export_with).
    pub fn export<W: Write>(&self, writer: W) -> io::Result<usize> {
        self.export_with(writer, &Format::default())
    }

    /// Writes every entry as a `<key> <value>` line and returns the number of lines.
    ///
    /// # Errors
    ///
    /// Any error of `writer`.
    pub fn export_with<W: Write>(&self, writer: W, format: &Format) -> io::Result<usize> {
        let mut writer = BufWriter::new(writer);
        let lines = match format.order {
            Order::Preorder => write_entries(&mut writer, self.preorder(), format.escape)?,
            Order::Inorder => write_entries(&mut writer, self.iter(), format.escape)?,
        };
        writer.flush()?;
        debug!("exported {lines} entries");
        Ok(lines)
    }
}

impl<K, V> RbMap<K, V>
where
    K: FromStr + Ord,
    V: FromStr,
{
    /// Reads entries with [`Format::default`]. See [`import_with`](Self::import_with).
    pub fn import<R: BufRead>(&mut self, reader: R) -> io::Result<ImportReport> {
        self.import_with(reader, &Format::default())
    }

    /// Inserts the entries of every `<key> <value>` line of `reader`.
    ///
    /// Reading stops without an error at the first line that does not hold exactly
    /// two tokens, has a bad escape or a token that does not parse. Entries read
    /// before it stay in the map. Keys already present are skipped.
    ///
    /// # Errors
    ///
    /// Any error of `reader`, including text that is not UTF-8.
    pub fn import_with<R: BufRead>(
        &mut self,
        reader: R,
        format: &Format,
    ) -> io::Result<ImportReport> {
        let mut report = ImportReport::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let Some((key, value)) = parse_line(&line, format.escape) else {
                debug!("import stopped at malformed line {}: {line:?}", index + 1);
                report.stopped_at = Some(index + 1);
                break;
            };
            match self.insert(key, value) {
                None => report.inserted += 1,
                Some(_) => report.duplicates += 1,
            }
        }
        debug!(
            "imported {} entries, skipped {} duplicates",
            report.inserted, report.duplicates
        );
        Ok(report)
    }
}

fn write_entries<'a, W, K, V, I>(writer: &mut W, entries: I, escape: bool) -> io::Result<usize>
where
    W: Write,
    K: Display + 'a,
    V: Display + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut lines = 0;
    for (key, value) in entries {
        let (key, value) = (key.to_string(), value.to_string());
        if escape {
            writeln!(writer, "{} {}", escape_token(&key), escape_token(&value))?;
        } else {
            writeln!(writer, "{key} {value}")?;
        }
        lines += 1;
    }
    Ok(lines)
}

fn parse_line<K, V>(line: &str, escape: bool) -> Option<(K, V)>
where
    K: FromStr,
    V: FromStr,
{
    let mut tokens = line.split_whitespace();
    let (Some(key), Some(value), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return None;
    };

    let decode = |token| {
        if escape {
            unescape_token(token)
        } else {
            Some(Cow::Borrowed(token))
        }
    };
    let key = decode(key)?.parse().ok()?;
    let value = decode(value)?.parse().ok()?;
    Some((key, value))
}

fn escape_token(token: &str) -> Cow<'_, str> {
    if token.is_empty() {
        return Cow::Borrowed(r"\e");
    }
    if !token.contains(|c: char| c == '\\' || c.is_whitespace()) {
        return Cow::Borrowed(token);
    }

    let mut out = String::with_capacity(token.len() + 8);
    for c in token.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            ' ' => out.push_str(r"\s"),
            '\t' => out.push_str(r"\t"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\x0c' => out.push_str(r"\f"),
            c if c.is_whitespace() => out.push_str(&format!("\\u{{{:x}}}", u32::from(c))),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// `None` on an unknown or truncated escape.
fn unescape_token(token: &str) -> Option<Cow<'_, str>> {
    if token == r"\e" {
        return Some(Cow::Borrowed(""));
    }
    if !token.contains('\\') {
        return Some(Cow::Borrowed(token));
    }

    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let unescaped = match chars.next()? {
            '\\' => '\\',
            's' => ' ',
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            'u' => {
                let rest = chars.as_str().strip_prefix('{')?;
                let (hex, rest) = rest.split_once('}')?;
                let c = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
                chars = rest.chars();
                c
            }
            _ => return None,
        };
        out.push(unescaped);
    }
    Some(Cow::Owned(out))
}
