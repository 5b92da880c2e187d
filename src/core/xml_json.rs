//! XML ⇄ JSON transcoding.
//!
//! The mapping is purely structural:
//!
//! - every element becomes a key of its parent object;
//! - repeated sibling elements collapse into an array, in document order;
//! - a leaf element becomes its text, as a JSON number when the text is a
//!   canonical number and as a string otherwise (`""` when empty);
//! - attributes become keys next to child elements, and text mixed with
//!   children or attributes is stored under `content`.
//!
//! Object keys keep document order, so the same input always renders the same
//! output.

use crate::utils::error::{Result, TradeError};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Number, Value};

pub const CONTENT_KEY: &str = "content";

struct Frame {
    name: String,
    attrs: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let mut attrs = Map::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?;
            attrs.insert(key, coerce_text(&value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        if self.attrs.is_empty() && self.children.is_empty() {
            return (self.name, coerce_text(&self.text));
        }

        let mut object = self.attrs;
        for (key, value) in self.children {
            append_child(&mut object, key, value);
        }
        if !self.text.is_empty() {
            append_child(&mut object, CONTENT_KEY.to_string(), coerce_text(&self.text));
        }
        (self.name, Value::Object(object))
    }
}

/// Second and later siblings with the same name turn the slot into an array.
fn append_child(object: &mut Map<String, Value>, key: String, value: Value) {
    match object.get_mut(&key) {
        Some(Value::Array(existing)) => existing.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            object.insert(key, value);
        }
    }
}

fn is_canonical_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && text != "-0"
}

/// Numbers only when rendering them back gives the exact same text, so
/// `"0101"` or `"1.50"` stay strings.
fn coerce_text(text: &str) -> Value {
    if is_canonical_integer(text) {
        if let Ok(n) = text.parse::<i64>() {
            return Value::from(n);
        }
    } else if text.contains('.') {
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            if number.to_string() == text {
                return Value::Number(number);
            }
        }
    }
    Value::String(text.to_string())
}

/// Converts an XML document into its JSON mirror.
pub fn xml_to_value(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = Map::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Frame::open(&e)?),
            Event::Empty(e) => {
                let (name, value) = Frame::open(&e)?.close();
                match stack.last_mut() {
                    Some(parent) => append_child(&mut parent.children, name, value),
                    None => append_child(&mut root, name, value),
                }
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| TradeError::parse("closing tag without an opening tag"))?;
                let (name, value) = frame.close();
                match stack.last_mut() {
                    Some(parent) => append_child(&mut parent.children, name, value),
                    None => append_child(&mut root, name, value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(TradeError::parse("unexpected end of document, unclosed elements remain"));
    }
    if root.is_empty() {
        return Err(TradeError::parse("document has no root element"));
    }
    Ok(Value::Object(root))
}

/// Converts an XML document into pretty-printed JSON text.
pub fn xml_to_json(xml: &str) -> Result<String> {
    let value = xml_to_value(xml)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Rebuilds XML from a JSON mirror. Attributes come back as child elements,
/// so the result is structurally equivalent rather than byte-identical.
pub fn json_to_xml(value: &Value) -> Result<String> {
    let Value::Object(root) = value else {
        return Err(TradeError::Config {
            message: "JSON document must be an object to convert to XML".to_string(),
        });
    };

    let mut out = String::new();
    for (name, child) in root {
        write_element(&mut out, name, child);
    }
    Ok(out)
}

fn write_element(out: &mut String, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(out, name, item);
            }
        }
        Value::Object(object) => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            for (key, child) in object {
                if key == CONTENT_KEY {
                    write_text(out, child);
                } else {
                    write_element(out, key, child);
                }
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        leaf => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            write_text(out, leaf);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_text(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(&escape(s.as_str())),
        Value::Null => {}
        other => out.push_str(&other.to_string()),
    }
}
