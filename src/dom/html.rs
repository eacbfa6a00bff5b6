//! Parser for rendered markup: elements, attributes, text and comments.
//!
//! The markup writer closes every non-void element and escapes text and
//! attribute values, so the parser only recovers from two things: end tags
//! with no open element are dropped, and a `<` that does not start a tag is
//! text.

use indexmap::IndexMap;

use super::{Dom, NodeId};
use crate::{Error, Result};

type Attributes = IndexMap<String, String>;

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, token: &str) -> bool {
        let matched = self.rest().starts_with(token);
        if matched {
            self.pos += token.len();
        }
        matched
    }

    fn bump_char(&mut self) {
        self.pos += self.rest().chars().next().map_or(0, char::len_utf8);
    }

    /// Advances over bytes accepted by `accept`. The predicate must answer
    /// alike for every non-ASCII byte so the cursor stays on a character
    /// boundary.
    fn take_while(&mut self, mut accept: impl FnMut(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&mut accept) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn skip_ws(&mut self) {
        self.take_while(|b| b.is_ascii_whitespace());
    }

    /// Returns the text before `token` and moves past the token.
    fn take_until(&mut self, token: &str) -> Option<&'a str> {
        let rest = self.rest();
        let offset = rest.find(token)?;
        self.pos += offset + token.len();
        Some(&rest[..offset])
    }
}

pub(crate) fn parse_html(markup: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let mut open = vec![dom.root];
    let mut cursor = Cursor::new(markup);

    while !cursor.at_end() {
        if cursor.eat("<!--") {
            cursor
                .take_until("-->")
                .ok_or_else(|| Error::HtmlParse("unclosed HTML comment".into()))?;
        } else if cursor.rest().starts_with("</") {
            let tag = end_tag(&mut cursor)?;
            if let Some(index) = open
                .iter()
                .rposition(|node| dom.tag_name(*node) == Some(tag.as_str()))
            {
                open.truncate(index);
            }
        } else if starts_element(cursor.rest()) {
            let (tag, attributes, self_closing) = start_tag(&mut cursor)?;
            let node = dom.create_element(innermost(&open)?, tag.clone(), attributes);
            if !self_closing && !is_void_tag(&tag) {
                open.push(node);
            }
        } else {
            let start = cursor.pos;
            cursor.bump_char();
            cursor.take_while(|b| b != b'<');
            let text = decode_character_references(&markup[start..cursor.pos]);
            dom.create_text(innermost(&open)?, text);
        }
    }

    Ok(dom)
}

fn innermost(open: &[NodeId]) -> Result<NodeId> {
    open.last()
        .copied()
        .ok_or_else(|| Error::HtmlParse("no open element".into()))
}

fn starts_element(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.first() == Some(&b'<') && bytes.get(1).is_some_and(u8::is_ascii_alphabetic)
}

fn start_tag(cursor: &mut Cursor<'_>) -> Result<(String, Attributes, bool)> {
    cursor.eat("<");
    let tag = cursor.take_while(is_tag_name_byte).to_ascii_lowercase();
    let mut attributes = Attributes::new();

    loop {
        cursor.skip_ws();
        if cursor.eat(">") {
            return Ok((tag, attributes, false));
        }
        if cursor.eat("/>") {
            return Ok((tag, attributes, true));
        }

        let name = cursor.take_while(is_attribute_name_byte);
        if name.is_empty() {
            return Err(Error::HtmlParse(match cursor.rest().chars().next() {
                Some(unexpected) => format!("unexpected '{unexpected}' in <{tag}>"),
                None => format!("unclosed start tag <{tag}>"),
            }));
        }

        cursor.skip_ws();
        let value = if cursor.eat("=") {
            cursor.skip_ws();
            attribute_value(cursor, &tag)?
        } else {
            String::new()
        };
        attributes.entry(name.to_ascii_lowercase()).or_insert(value);
    }
}

fn attribute_value(cursor: &mut Cursor<'_>, tag: &str) -> Result<String> {
    for quote in ["\"", "'"] {
        if cursor.eat(quote) {
            let raw = cursor.take_until(quote).ok_or_else(|| {
                Error::HtmlParse(format!("unclosed attribute value in <{tag}>"))
            })?;
            return Ok(decode_character_references(raw));
        }
    }
    let raw = cursor.take_while(|b| !b.is_ascii_whitespace() && b != b'>');
    Ok(decode_character_references(raw))
}

fn end_tag(cursor: &mut Cursor<'_>) -> Result<String> {
    cursor.eat("</");
    cursor.skip_ws();
    let tag = cursor.take_while(is_tag_name_byte).to_ascii_lowercase();
    cursor
        .take_until(">")
        .ok_or_else(|| Error::HtmlParse(format!("unclosed end tag </{tag}")))?;
    Ok(tag)
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn is_attribute_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'@' | b'.')
}

/// Decodes the named references the markup writer emits, `&apos;`,
/// `&nbsp;` and numeric references. Anything else is kept as written.
fn decode_character_references(text: &str) -> String {
    let mut pieces = text.split('&');
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let decoded = piece
            .split_once(';')
            .and_then(|(name, rest)| Some((character_reference(name)?, rest)));
        match decoded {
            Some((ch, rest)) => {
                out.push(ch);
                out.push_str(rest);
            }
            None => {
                out.push('&');
                out.push_str(piece);
            }
        }
    }
    out
}

fn character_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeType;

    fn element_tags(dom: &Dom) -> Vec<&str> {
        let mut elements = Vec::new();
        dom.collect_elements_dfs(dom.root, &mut elements);
        elements
            .iter()
            .filter_map(|id| dom.tag_name(*id))
            .collect()
    }

    #[test]
    fn decodes_escaped_and_numeric_references() {
        assert_eq!(decode_character_references("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_character_references("&#65;&#x42;"), "AB");
        assert_eq!(decode_character_references("&copy; & &unknown;"), "&copy; & &unknown;");
    }

    #[test]
    fn void_and_self_closing_elements_take_no_children() -> Result<()> {
        let dom = parse_html("<label><input value=\"x\"><br/>text</label>")?;
        assert_eq!(element_tags(&dom), vec!["label", "input", "br"]);
        let label = dom.nodes[dom.root.0].children[0];
        assert_eq!(dom.nodes[label.0].children.len(), 3);
        Ok(())
    }

    #[test]
    fn handler_attributes_keep_their_prefix() -> Result<()> {
        let dom = parse_html("<button blazor:onclick=\"3\" disabled class='a' class=\"b\">go</button>")?;
        let button = dom.nodes[dom.root.0].children[0];
        let attributes = dom
            .element(button)
            .map(|element| {
                element
                    .attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let expected = [("blazor:onclick", "3"), ("disabled", ""), ("class", "a")]
            .map(|(name, value)| (name.to_string(), value.to_string()));
        assert_eq!(attributes, expected.to_vec());
        Ok(())
    }

    #[test]
    fn stray_markup_degrades_to_text() -> Result<()> {
        let dom = parse_html("<p>1 < 2</p></section><!-- note -->")?;
        assert_eq!(element_tags(&dom), vec!["p"]);
        assert_eq!(dom.text_content(dom.root), "1 < 2");
        let p = dom.nodes[dom.root.0].children[0];
        let text = dom.nodes[p.0].children[0];
        assert!(matches!(&dom.nodes[text.0].node_type, NodeType::Text(text) if text == "1 < 2"));
        Ok(())
    }

    #[test]
    fn unterminated_constructs_are_errors() {
        assert!(matches!(parse_html("<p>x</p><!-- open"), Err(Error::HtmlParse(_))));
        assert!(matches!(parse_html("<a href=\"x>"), Err(Error::HtmlParse(_))));
        assert!(matches!(parse_html("<div"), Err(Error::HtmlParse(_))));
    }
}
