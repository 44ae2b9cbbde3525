//! Re-rendering of exported template documents.
//!
//! The API returns compact documents. Both formats are pretty-printed before
//! they are written, and the export timestamp can be pinned to a fixed value
//! so repeated exports of an unchanged template are byte-identical.

use crate::api::ConfigFormat;
use crate::{Result, TemplateToolError};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::fmt;

/// Value written to the export date when `--reset-date` is given.
pub const EXPORT_DATE_SENTINEL: &str = "2000-01-01T00:00:00Z";

const JSON_INDENT: &[u8] = b"    ";
const XML_INDENT: usize = 2;
const DATE_ELEMENT: &[u8] = b"date";

/// Render an exported document in its own format.
pub fn render(format: ConfigFormat, source: &str, reset_date: bool) -> Result<String> {
    match format {
        ConfigFormat::Xml => render_xml(source, reset_date),
        ConfigFormat::Json => render_json(source, reset_date),
    }
}

/// Pretty-print a JSON export with sorted keys and 4-space indentation.
pub fn render_json(source: &str, reset_date: bool) -> Result<String> {
    let mut document: Value = serde_json::from_str(source)?;

    if reset_date {
        let export = document
            .get_mut("zabbix_export")
            .and_then(Value::as_object_mut)
            .ok_or(TemplateToolError::MissingDateField)?;
        export.insert("date".to_string(), Value::from(EXPORT_DATE_SENTINEL));
    }

    // serde_json::Map is BTreeMap-backed here, so object keys serialize sorted.
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(JSON_INDENT));
    document.serialize(&mut serializer)?;

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Pretty-print an XML export with 2-space indentation.
///
/// Only whitespace between elements is replaced by the writer's indentation;
/// text content, including its leading and trailing whitespace, is written
/// back as exported.
///
/// With `reset_date`, the text of the `date` element directly under the root
/// is replaced. A document without such an element is left as it is; newer
/// servers no longer put a date into exports.
pub fn render_xml(source: &str, reset_date: bool) -> Result<String> {
    let mut reader = Reader::from_str(source);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', XML_INDENT);
    let mut depth = 0usize;
    let mut started = false;
    let mut in_date = false;
    let mut date_found = false;
    let mut just_opened = false;
    let mut pending_blank: Option<BytesText<'static>> = None;

    loop {
        let event = reader.read_event().map_err(xml_error)?;

        if !started {
            started = true;
            if !matches!(event, Event::Decl(_) | Event::Eof) {
                writer
                    .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                    .map_err(xml_error)?;
            }
        }

        // the old date text is dropped and replaced when the element closes
        if in_date && matches!(event, Event::Text(_) | Event::CData(_)) {
            continue;
        }

        // Blank text is indentation unless it is the whole body of an element.
        if let Event::Text(text) = &event {
            if text.iter().all(u8::is_ascii_whitespace) {
                if just_opened {
                    pending_blank = Some(text.clone().into_owned());
                }
                continue;
            }
        }

        let blank_body = pending_blank.take();
        let opens = matches!(event, Event::Start(_));

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                depth += 1;
                if reset_date && depth == 2 && start.name().as_ref() == DATE_ELEMENT {
                    in_date = true;
                    date_found = true;
                }
                writer.write_event(Event::Start(start)).map_err(xml_error)?;
            }
            Event::End(end) => {
                if in_date {
                    writer
                        .write_event(Event::Text(BytesText::new(EXPORT_DATE_SENTINEL)))
                        .map_err(xml_error)?;
                    in_date = false;
                } else if let Some(blank) = blank_body {
                    writer.write_event(Event::Text(blank)).map_err(xml_error)?;
                }
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(end)).map_err(xml_error)?;
            }
            Event::Empty(empty)
                if reset_date && depth == 1 && empty.name().as_ref() == DATE_ELEMENT =>
            {
                date_found = true;
                writer.write_event(Event::Start(empty.clone())).map_err(xml_error)?;
                writer
                    .write_event(Event::Text(BytesText::new(EXPORT_DATE_SENTINEL)))
                    .map_err(xml_error)?;
                writer.write_event(Event::End(empty.to_end())).map_err(xml_error)?;
            }
            other => writer.write_event(other).map_err(xml_error)?,
        }

        just_opened = opens;
    }

    if reset_date && !date_found {
        tracing::warn!("Export document has no date element, leaving it unchanged");
    }

    let mut rendered = String::from_utf8(writer.into_inner()).map_err(xml_error)?;
    rendered.push('\n');
    Ok(rendered)
}

fn xml_error(err: impl fmt::Display) -> TemplateToolError {
    TemplateToolError::Xml(err.to_string())
}
