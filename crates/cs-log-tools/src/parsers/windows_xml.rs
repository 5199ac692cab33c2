//! Windows event log records exported as one `<Event>` XML document per line.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use cs_protocol::{LogType, Record};

use crate::timestamp::{TimestampDialect, normalize};
use crate::types::{LineParser, LogFormat, ParseContext};

pub struct WindowsXmlParser;

impl LineParser for WindowsXmlParser {
    fn format(&self) -> LogFormat {
        LogFormat::WindowsXml
    }

    fn matches(&self, line: &str) -> bool {
        line.starts_with("<Event")
    }

    fn extract(&self, line: &str, ctx: &ParseContext) -> Option<Record> {
        let mut reader = Reader::from_str(line);
        reader.config_mut().trim_text(true);

        let mut r = Record::new(LogType::Windows, line);
        let mut path: Vec<String> = Vec::new();
        let mut data_name: Option<String> = None;
        let mut event_id: Option<String> = None;
        let mut saw_root = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e);
                    if path.is_empty() {
                        if saw_root || name != "Event" {
                            return None;
                        }
                        saw_root = true;
                    }
                    on_element(&e, &name, &mut r, &mut data_name, ctx);
                    path.push(name);
                }
                Ok(Event::Empty(e)) => {
                    let name = local_name(&e);
                    if path.is_empty() {
                        // A self-closing `<Event/>` is a complete, empty document.
                        if saw_root || name != "Event" {
                            return None;
                        }
                        saw_root = true;
                        continue;
                    }
                    on_element(&e, &name, &mut r, &mut data_name, ctx);
                    data_name = None;
                }
                Ok(Event::Text(t)) => {
                    if path.is_empty() {
                        if t.iter().all(u8::is_ascii_whitespace) {
                            continue;
                        }
                        return None;
                    }
                    let text = t.unescape().ok()?.into_owned();
                    match path.last().map(String::as_str) {
                        Some("EventID") => event_id = Some(text),
                        Some("Computer") => r.host = Some(text),
                        Some("Data") => {
                            if let Some(name) = data_name.as_deref() {
                                apply_data(&mut r, name, text);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(_)) => {
                    if path.pop().as_deref() == Some("Data") {
                        data_name = None;
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(_) => return None,
            }
        }

        if !saw_root || !path.is_empty() {
            return None;
        }

        r.message = Some(match event_id {
            Some(id) => format!("windows_event_{id}"),
            None => "windows_event".to_string(),
        });
        Some(r)
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn on_element(
    e: &BytesStart<'_>,
    name: &str,
    r: &mut Record,
    data_name: &mut Option<String>,
    ctx: &ParseContext,
) {
    match name {
        "TimeCreated" => {
            if let Some(ts) = attribute(e, "SystemTime") {
                r.timestamp = normalize(&ts, TimestampDialect::Any, ctx);
            }
        }
        "Provider" => {
            if let Some(provider) = attribute(e, "Name") {
                r.service = Some(provider);
            }
        }
        "Data" => *data_name = attribute(e, "Name"),
        _ => {}
    }
}

fn apply_data(r: &mut Record, name: &str, value: String) {
    if value.is_empty() || value == "-" {
        return;
    }
    match name {
        "IpAddress" => r.ip = Some(value),
        "TargetUserName" => r.user = Some(value),
        "SubjectUserName" if r.user.is_none() => r.user = Some(value),
        _ => {}
    }
}
