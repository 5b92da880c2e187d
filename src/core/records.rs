use crate::domain::model::TradeItem;
use crate::utils::error::{Result, TradeError};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

const ITEM_TAG: &str = "item";

/// An `<item>` being filled in: its slot in the output, and the child field
/// currently open inside it.
struct OpenItem {
    depth: usize,
    index: usize,
    field: Option<(String, String)>,
}

/// Collects every `<item>` element in the document, at any depth, as a flat
/// map of its child element names to their text content. Items nested inside
/// other items are collected too, in the order their opening tags appear.
///
/// Malformed XML fails the whole parse. Text inside deeper descendants of a
/// field is folded into that field.
pub fn parse_items(xml: &str) -> Result<Vec<TradeItem>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items: Vec<TradeItem> = Vec::new();
    let mut open: Vec<OpenItem> = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                if name == ITEM_TAG {
                    open.push(OpenItem {
                        depth,
                        index: items.len(),
                        field: None,
                    });
                    items.push(TradeItem::new());
                } else if let Some(current) = open.last_mut() {
                    if depth == current.depth + 1 {
                        current.field = Some((name, String::new()));
                    }
                }
            }
            Event::Empty(e) => {
                saw_root = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

                if name == ITEM_TAG {
                    items.push(TradeItem::new());
                } else if let Some(current) = open.last() {
                    if depth == current.depth {
                        items[current.index].insert(name, "");
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = open.last_mut().and_then(|o| o.field.as_mut()) {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some((_, text)) = open.last_mut().and_then(|o| o.field.as_mut()) {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let closes_item = match open.last_mut() {
                    Some(current) if depth == current.depth + 1 => {
                        if let Some((name, text)) = current.field.take() {
                            items[current.index].insert(name, text);
                        }
                        false
                    }
                    Some(current) => depth == current.depth,
                    None => false,
                };
                if closes_item {
                    open.pop();
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| TradeError::parse("closing tag without an opening tag"))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(TradeError::parse("unexpected end of document, unclosed elements remain"));
    }
    if !saw_root {
        return Err(TradeError::parse("document has no root element"));
    }

    tracing::debug!("Parsed {} items from XML", items.len());
    Ok(items)
}
