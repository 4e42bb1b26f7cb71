//! Markup reader.
//!
//! Wraps the quick-xml pull parser and reduces its event vocabulary to the
//! three events the tree builder cares about: an opening tag (with its
//! attributes), a run of text, and a closing tag. Declarations, comments,
//! processing instructions and doctypes are skipped. Closing-tag names are
//! *not* checked here; nesting is verified by the tree builder.

use std::collections::BTreeMap;
use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ImportError, Result};

use super::span::Location;

/// A single markup event with the byte offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    Open {
        name: String,
        attributes: BTreeMap<String, String>,
        self_closing: bool,
        offset: usize,
    },
    Text {
        text: String,
        offset: usize,
    },
    Close {
        name: String,
        offset: usize,
    },
}

/// Pull-based reader over a markup string.
pub struct MarkupReader<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
}

impl<'a> MarkupReader<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;
        Self { source, reader }
    }

    /// Read the next event, or `None` at end of input.
    pub fn next_event(&mut self) -> Result<Option<MarkupEvent>> {
        loop {
            let offset = self.position();
            let event = self
                .reader
                .read_event()
                .map_err(|e| self.error(e.to_string(), self.position()))?;

            match event {
                Event::Start(e) => return self.open(&e, false, offset).map(Some),
                Event::Empty(e) => return self.open(&e, true, offset).map(Some),
                Event::End(e) => {
                    let name = str::from_utf8(e.name().as_ref())
                        .map_err(|err| self.error(format!("invalid UTF-8 in tag name: {err}"), offset))?
                        .to_string();
                    return Ok(Some(MarkupEvent::Close { name, offset }));
                }
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|err| self.error(err.to_string(), offset))?;
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Some(MarkupEvent::Text {
                        text: text.to_string(),
                        offset,
                    }));
                }
                Event::CData(c) => {
                    let bytes = c.into_inner();
                    let text = str::from_utf8(&bytes)
                        .map_err(|err| self.error(format!("invalid UTF-8 in CDATA: {err}"), offset))?
                        .trim()
                        .to_string();
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Some(MarkupEvent::Text { text, offset }));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Location of a byte offset in the underlying source.
    pub fn locate(&self, offset: usize) -> Location {
        Location::in_source(self.source, offset)
    }

    fn open(&self, e: &BytesStart<'_>, self_closing: bool, offset: usize) -> Result<MarkupEvent> {
        let name = str::from_utf8(e.name().as_ref())
            .map_err(|err| self.error(format!("invalid UTF-8 in tag name: {err}"), offset))?
            .to_string();

        let mut attributes = BTreeMap::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| self.error(err.to_string(), offset))?;
            let key = str::from_utf8(attr.key.as_ref())
                .map_err(|err| self.error(format!("invalid UTF-8 in attribute name: {err}"), offset))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| self.error(err.to_string(), offset))?
                .into_owned();
            attributes.insert(key, value);
        }

        Ok(MarkupEvent::Open {
            name,
            attributes,
            self_closing,
            offset,
        })
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn error(&self, message: String, offset: usize) -> ImportError {
        ImportError::Xml {
            message,
            location: self.locate(offset),
        }
    }
}
