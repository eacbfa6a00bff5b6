//! CSS selector parsing and matching over the markup DOM.
//!
//! Rendered markup is static, so state pseudo-classes such as `:checked` or
//! `:disabled` are answered from attributes. Interaction states (`:focus`,
//! `:hover`, `:active`) never match.

use super::{Dom, NodeId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    FirstOfType,
    LastOfType,
    OnlyChild,
    OnlyOfType,
    Checked,
    Disabled,
    Enabled,
    Required,
    Optional,
    ReadOnly,
    ReadWrite,
    Empty,
    Interaction,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    Not(Vec<Vec<SelectorPart>>),
    Is(Vec<Vec<SelectorPart>>),
    Has(Vec<Vec<SelectorPart>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nth {
    Odd,
    Even,
    AnPlusB(i64, i64),
}

impl Nth {
    fn matches(self, index: usize) -> bool {
        match self {
            Self::Odd => index % 2 == 1,
            Self::Even => index % 2 == 0,
            Self::AnPlusB(a, b) => {
                let diff = index as i64 - b;
                if a == 0 {
                    diff == 0
                } else {
                    diff % a == 0 && diff / a >= 0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SelectorStep {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo_classes: Vec<PseudoClass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    step: SelectorStep,
    // Relation to the part on the left.
    combinator: Option<Combinator>,
}

fn unsupported(selector: &str) -> Error {
    Error::UnsupportedSelector(selector.into())
}

fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    split_selector_groups(selector)?
        .iter()
        .map(|group| parse_selector_chain(group))
        .collect()
}

fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut depth = Depth::default();

    for ch in selector.chars() {
        if ch == ',' && depth.is_top_level() {
            let trimmed = current.trim();
            if trimmed.is_empty() {
                return Err(unsupported(selector));
            }
            groups.push(trimmed.to_string());
            current.clear();
            continue;
        }
        depth.track(ch).ok_or_else(|| unsupported(selector))?;
        current.push(ch);
    }

    let trimmed = current.trim();
    if !depth.is_balanced() || trimmed.is_empty() {
        return Err(unsupported(selector));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

#[derive(Default)]
struct Depth {
    brackets: usize,
    parens: usize,
    quote: Option<char>,
}

impl Depth {
    /// Tracks nesting for one character; `None` on an unbalanced closer.
    fn track(&mut self, ch: char) -> Option<()> {
        if let Some(quote) = self.quote {
            if ch == quote {
                self.quote = None;
            }
            return Some(());
        }
        match ch {
            '"' | '\'' => self.quote = Some(ch),
            '[' => self.brackets += 1,
            ']' => self.brackets = self.brackets.checked_sub(1)?,
            '(' => self.parens += 1,
            ')' => self.parens = self.parens.checked_sub(1)?,
            _ => {}
        }
        Some(())
    }

    fn is_top_level(&self) -> bool {
        self.brackets == 0 && self.parens == 0 && self.quote.is_none()
    }

    fn is_balanced(&self) -> bool {
        self.is_top_level()
    }
}

fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(unsupported(selector));
    }

    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize_selector(selector)? {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::AdjacentSibling),
            "~" => Some(Combinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || parts.is_empty() {
                return Err(unsupported(selector));
            }
            pending = Some(combinator);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(unsupported(selector));
    }
    Ok(parts)
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = Depth::default();

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            tokens.push(trimmed.to_string());
        }
        current.clear();
    };

    for ch in selector.chars() {
        if depth.is_top_level() {
            if matches!(ch, '>' | '+' | '~') {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
                continue;
            }
            if ch.is_ascii_whitespace() {
                flush(&mut current, &mut tokens);
                continue;
            }
        }
        depth.track(ch).ok_or_else(|| unsupported(selector))?;
        current.push(ch);
    }

    if !depth.is_balanced() {
        return Err(unsupported(selector));
    }
    flush(&mut current, &mut tokens);
    Ok(tokens)
}

fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();
    let mut universal = false;

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if universal || step.tag.is_some() {
                    return Err(unsupported(part));
                }
                universal = true;
                i += 1;
            }
            b'#' => {
                let (id, next) = parse_selector_ident(part, i + 1).ok_or_else(|| unsupported(part))?;
                if step.id.replace(id).is_some() {
                    return Err(unsupported(part));
                }
                i = next;
            }
            b'.' => {
                let (class_name, next) =
                    parse_selector_ident(part, i + 1).ok_or_else(|| unsupported(part))?;
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            b':' => {
                let (pseudo, next) = parse_pseudo(part, i).ok_or_else(|| unsupported(part))?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if i != 0 {
                    return Err(unsupported(part));
                }
                let (tag, next) = parse_selector_ident(part, i).ok_or_else(|| unsupported(part))?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    Ok(step)
}

const SIMPLE_PSEUDO_CLASSES: &[(&str, PseudoClass)] = &[
    ("first-child", PseudoClass::FirstChild),
    ("last-child", PseudoClass::LastChild),
    ("first-of-type", PseudoClass::FirstOfType),
    ("last-of-type", PseudoClass::LastOfType),
    ("only-child", PseudoClass::OnlyChild),
    ("only-of-type", PseudoClass::OnlyOfType),
    ("checked", PseudoClass::Checked),
    ("disabled", PseudoClass::Disabled),
    ("enabled", PseudoClass::Enabled),
    ("required", PseudoClass::Required),
    ("optional", PseudoClass::Optional),
    ("read-only", PseudoClass::ReadOnly),
    ("read-write", PseudoClass::ReadWrite),
    ("empty", PseudoClass::Empty),
    ("focus-within", PseudoClass::Interaction),
    ("focus", PseudoClass::Interaction),
    ("hover", PseudoClass::Interaction),
    ("active", PseudoClass::Interaction),
];

fn parse_pseudo(part: &str, colon: usize) -> Option<(PseudoClass, usize)> {
    let start = colon + 1;
    let tail = part.get(start..)?;
    let name_end = tail
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-'))
        .unwrap_or(tail.len());
    let name = tail[..name_end].to_ascii_lowercase();

    if tail.as_bytes().get(name_end) != Some(&b'(') {
        let next = start + name_end;
        if !ends_step_at(part, next) {
            return None;
        }
        return SIMPLE_PSEUDO_CLASSES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, pseudo)| (pseudo.clone(), next));
    }

    let body_start = name_end + 1;
    let close = find_matching_paren(&tail[body_start..])?;
    let body = tail[body_start..body_start + close].trim();
    let next = start + body_start + close + 1;
    if body.is_empty() || !ends_step_at(part, next) {
        return None;
    }

    let pseudo = match name.as_str() {
        "not" => PseudoClass::Not(parse_selector_groups(body).ok()?),
        "is" | "where" => PseudoClass::Is(parse_selector_groups(body).ok()?),
        "has" => PseudoClass::Has(parse_selector_groups(body).ok()?),
        "nth-child" => PseudoClass::NthChild(parse_nth(body)?),
        "nth-last-child" => PseudoClass::NthLastChild(parse_nth(body)?),
        "nth-of-type" => PseudoClass::NthOfType(parse_nth(body)?),
        "nth-last-of-type" => PseudoClass::NthLastOfType(parse_nth(body)?),
        _ => return None,
    };
    Some((pseudo, next))
}

fn ends_step_at(part: &str, at: usize) -> bool {
    part.as_bytes()
        .get(at)
        .is_none_or(|next| matches!(next, b'.' | b'#' | b'[' | b':'))
}

fn find_matching_paren(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    for (idx, b) in body.bytes().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_nth(raw: &str) -> Option<Nth> {
    let expr = raw
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match expr.as_str() {
        "odd" => return Some(Nth::Odd),
        "even" => return Some(Nth::Even),
        _ => {}
    }

    let Some(n_pos) = expr.find('n') else {
        let value = expr.parse::<i64>().ok().filter(|value| *value > 0)?;
        return Some(Nth::AnPlusB(0, value));
    };

    let (a_part, rest) = expr.split_at(n_pos);
    let b_part = &rest[1..];
    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        _ => a_part.parse::<i64>().ok()?,
    };
    if b_part.is_empty() {
        return Some(Nth::AnPlusB(a, 0));
    }
    if !(b_part.starts_with('+') || b_part.starts_with('-')) {
        return None;
    }
    let b = b_part.parse::<i64>().ok()?;
    Some(Nth::AnPlusB(a, b))
}

fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut out = String::new();
    let mut end = start;
    while end < bytes.len() {
        match bytes[end] {
            b'\\' => {
                let escaped = src.get(end + 1..)?.chars().next()?;
                out.push(escaped);
                end += 1 + escaped.len_utf8();
            }
            b if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b >= 0x80 => {
                let ch = src[end..].chars().next()?;
                out.push(ch);
                end += ch.len_utf8();
            }
            _ => break,
        }
    }
    (!out.is_empty()).then_some((out, end))
}

fn parse_attr_condition(src: &str, open_bracket: usize) -> Result<(AttrCondition, usize)> {
    let bytes = src.as_bytes();
    let mut i = open_bracket + 1;
    skip_ws(bytes, &mut i);

    let key_start = i;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i = (i + 2).min(bytes.len()),
            b if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'@' | b'.') => i += 1,
            _ => break,
        }
    }
    if key_start == i {
        return Err(unsupported(src));
    }
    let key = unescape(&src[key_start..i]).to_ascii_lowercase();
    skip_ws(bytes, &mut i);

    if bytes.get(i) == Some(&b']') {
        return Ok((AttrCondition::Exists { key }, i + 1));
    }

    let operator = match bytes.get(i) {
        Some(b'=') => {
            i += 1;
            b'='
        }
        Some(op @ (b'^' | b'$' | b'*' | b'~' | b'|')) if bytes.get(i + 1) == Some(&b'=') => {
            i += 2;
            *op
        }
        _ => return Err(unsupported(src)),
    };

    skip_ws(bytes, &mut i);
    let value = parse_attr_value(src, &mut i)?;
    skip_ws(bytes, &mut i);
    if bytes.get(i) != Some(&b']') {
        return Err(unsupported(src));
    }

    let condition = match operator {
        b'=' => AttrCondition::Eq { key, value },
        b'^' => AttrCondition::StartsWith { key, value },
        b'$' => AttrCondition::EndsWith { key, value },
        b'*' => AttrCondition::Contains { key, value },
        b'~' => AttrCondition::Includes { key, value },
        _ => AttrCondition::DashMatch { key, value },
    };
    Ok((condition, i + 1))
}

fn parse_attr_value(src: &str, i: &mut usize) -> Result<String> {
    let bytes = src.as_bytes();
    let Some(&first) = bytes.get(*i) else {
        return Err(unsupported(src));
    };

    if first == b'"' || first == b'\'' {
        let start = *i + 1;
        let mut end = start;
        while end < bytes.len() && bytes[end] != first {
            end += if bytes[end] == b'\\' { 2 } else { 1 };
        }
        if end >= bytes.len() {
            return Err(unsupported(src));
        }
        *i = end + 1;
        return Ok(unescape(&src[start..end]));
    }

    let start = *i;
    while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b']' {
        *i += 1;
    }
    Ok(unescape(&src[start..*i]))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

impl Dom {
    /// Elements below `root` matching `selector`, in document order.
    pub(crate) fn query_selector_all_from(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut candidates = Vec::new();
        self.collect_elements_descendants_dfs(root, &mut candidates);
        Ok(candidates
            .into_iter()
            .filter(|node| groups.iter().any(|chain| self.matches_selector_chain(*node, chain)))
            .collect())
    }

    pub(crate) fn matches_selector(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        let groups = parse_selector_groups(selector)?;
        Ok(groups
            .iter()
            .any(|chain| self.matches_selector_chain(node_id, chain)))
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub(crate) fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if self.element(current).is_some()
                && groups
                    .iter()
                    .any(|chain| self.matches_selector_chain(current, chain))
            {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    fn matches_selector_chain(&self, node_id: NodeId, parts: &[SelectorPart]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        match last.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => self
                .parent(node_id)
                .is_some_and(|parent| self.matches_selector_chain(parent, rest)),
            Combinator::Descendant => {
                let mut cursor = self.parent(node_id);
                while let Some(ancestor) = cursor {
                    if self.matches_selector_chain(ancestor, rest) {
                        return true;
                    }
                    cursor = self.parent(ancestor);
                }
                false
            }
            Combinator::AdjacentSibling => self
                .previous_element_sibling(node_id)
                .is_some_and(|sibling| self.matches_selector_chain(sibling, rest)),
            Combinator::GeneralSibling => {
                let mut cursor = self.previous_element_sibling(node_id);
                while let Some(sibling) = cursor {
                    if self.matches_selector_chain(sibling, rest) {
                        return true;
                    }
                    cursor = self.previous_element_sibling(sibling);
                }
                false
            }
        }
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if step.tag.as_ref().is_some_and(|tag| *tag != element.tag_name) {
            return false;
        }
        if step
            .id
            .as_ref()
            .is_some_and(|id| element.attrs.get("id") != Some(id))
        {
            return false;
        }
        if step
            .classes
            .iter()
            .any(|class_name| !element.has_class(class_name))
        {
            return false;
        }

        let attrs_match = step.attrs.iter().all(|condition| match condition {
            AttrCondition::Exists { key } => element.attrs.contains_key(key),
            AttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
            AttrCondition::StartsWith { key, value } => element
                .attrs
                .get(key)
                .is_some_and(|attr| !value.is_empty() && attr.starts_with(value.as_str())),
            AttrCondition::EndsWith { key, value } => element
                .attrs
                .get(key)
                .is_some_and(|attr| !value.is_empty() && attr.ends_with(value.as_str())),
            AttrCondition::Contains { key, value } => element
                .attrs
                .get(key)
                .is_some_and(|attr| !value.is_empty() && attr.contains(value.as_str())),
            AttrCondition::Includes { key, value } => element
                .attrs
                .get(key)
                .is_some_and(|attr| attr.split_whitespace().any(|token| token == value)),
            AttrCondition::DashMatch { key, value } => element.attrs.get(key).is_some_and(|attr| {
                attr == value
                    || attr
                        .strip_prefix(value.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }),
        });
        if !attrs_match {
            return false;
        }

        step.pseudo_classes
            .iter()
            .all(|pseudo| self.matches_pseudo(node_id, pseudo))
    }

    fn matches_pseudo(&self, node_id: NodeId, pseudo: &PseudoClass) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        let has = |name: &str| element.attrs.contains_key(name);
        match pseudo {
            PseudoClass::FirstChild => self.previous_element_sibling(node_id).is_none(),
            PseudoClass::LastChild => self.next_element_sibling(node_id).is_none(),
            PseudoClass::OnlyChild => {
                self.previous_element_sibling(node_id).is_none()
                    && self.next_element_sibling(node_id).is_none()
            }
            PseudoClass::FirstOfType => self.position_among_siblings(node_id, true) == Some(1),
            PseudoClass::LastOfType => self
                .position_among_siblings(node_id, true)
                .zip(self.sibling_count(node_id, true))
                .is_some_and(|(index, total)| index == total),
            PseudoClass::OnlyOfType => self.sibling_count(node_id, true) == Some(1),
            PseudoClass::Checked => match element.tag_name.as_str() {
                "input" => has("checked"),
                "option" => has("selected"),
                _ => false,
            },
            PseudoClass::Disabled => is_form_control(&element.tag_name) && has("disabled"),
            PseudoClass::Enabled => is_form_control(&element.tag_name) && !has("disabled"),
            PseudoClass::Required => is_form_control(&element.tag_name) && has("required"),
            PseudoClass::Optional => is_form_control(&element.tag_name) && !has("required"),
            PseudoClass::ReadOnly => !is_editable(&element.tag_name) || has("readonly"),
            PseudoClass::ReadWrite => is_editable(&element.tag_name) && !has("readonly"),
            PseudoClass::Empty => self.nodes[node_id.0].children.is_empty(),
            PseudoClass::Interaction => false,
            PseudoClass::NthChild(nth) => self
                .position_among_siblings(node_id, false)
                .is_some_and(|index| nth.matches(index)),
            PseudoClass::NthLastChild(nth) => self
                .position_among_siblings(node_id, false)
                .zip(self.sibling_count(node_id, false))
                .is_some_and(|(index, total)| nth.matches(total + 1 - index)),
            PseudoClass::NthOfType(nth) => self
                .position_among_siblings(node_id, true)
                .is_some_and(|index| nth.matches(index)),
            PseudoClass::NthLastOfType(nth) => self
                .position_among_siblings(node_id, true)
                .zip(self.sibling_count(node_id, true))
                .is_some_and(|(index, total)| nth.matches(total + 1 - index)),
            PseudoClass::Not(groups) => !groups
                .iter()
                .any(|chain| self.matches_selector_chain(node_id, chain)),
            PseudoClass::Is(groups) => groups
                .iter()
                .any(|chain| self.matches_selector_chain(node_id, chain)),
            PseudoClass::Has(groups) => {
                let mut descendants = Vec::new();
                self.collect_elements_descendants_dfs(node_id, &mut descendants);
                descendants.iter().any(|descendant| {
                    groups
                        .iter()
                        .any(|chain| self.matches_selector_chain(*descendant, chain))
                })
            }
        }
    }

    /// Element siblings of `node_id` (itself included), optionally only
    /// those sharing its tag name.
    fn element_siblings(&self, node_id: NodeId, same_type: bool) -> Option<Vec<NodeId>> {
        let parent = self.parent(node_id)?;
        let tag_name = self.tag_name(node_id)?;
        Some(
            self.nodes[parent.0]
                .children
                .iter()
                .copied()
                .filter(|child| {
                    self.tag_name(*child)
                        .is_some_and(|tag| !same_type || tag == tag_name)
                })
                .collect(),
        )
    }

    /// One-based position among element siblings.
    fn position_among_siblings(&self, node_id: NodeId, same_type: bool) -> Option<usize> {
        self.element_siblings(node_id, same_type)?
            .iter()
            .position(|sibling| *sibling == node_id)
            .map(|index| index + 1)
    }

    fn sibling_count(&self, node_id: NodeId, same_type: bool) -> Option<usize> {
        self.element_siblings(node_id, same_type)
            .map(|siblings| siblings.len())
    }

    fn previous_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let children = &self.nodes[parent.0].children;
        let pos = children.iter().position(|id| *id == node_id)?;
        children[..pos]
            .iter()
            .rev()
            .find(|sibling| self.element(**sibling).is_some())
            .copied()
    }

    fn next_element_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        let parent = self.parent(node_id)?;
        let children = &self.nodes[parent.0].children;
        let pos = children.iter().position(|id| *id == node_id)?;
        children[pos + 1..]
            .iter()
            .find(|sibling| self.element(**sibling).is_some())
            .copied()
    }
}

fn is_form_control(tag: &str) -> bool {
    matches!(
        tag,
        "input" | "button" | "select" | "textarea" | "option" | "optgroup" | "fieldset"
    )
}

fn is_editable(tag: &str) -> bool {
    matches!(tag, "input" | "textarea")
}
