//! Datasource documents: rendered by the creators, inspected by
//! `nxsconfig record` and `nxsconfig describe`.

use crate::error::CreatorError;
use crate::tango::TangoHost;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::io::Cursor;

pub const TANGO_TYPE: &str = "TANGO";
pub const CLIENT_TYPE: &str = "CLIENT";

/// The `<device/>` element of a TANGO datasource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TangoSource {
    pub device: String,
    pub hostname: String,
    pub port: String,
    pub member: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceDef {
    pub name: String,
    pub source_type: String,
    pub device: Option<TangoSource>,
    pub record: Option<String>,
}

impl DataSourceDef {
    /// Datasource reading `attribute` of `device`.
    pub fn tango(name: &str, device: &str, host: &TangoHost, attribute: &str) -> Self {
        Self {
            name: name.to_string(),
            source_type: TANGO_TYPE.to_string(),
            device: Some(TangoSource {
                device: device.to_string(),
                hostname: host.host.clone(),
                port: host.port.to_string(),
                member: "attribute".to_string(),
            }),
            record: Some(attribute.to_string()),
        }
    }

    pub fn client(name: &str, record: &str) -> Self {
        Self {
            name: name.to_string(),
            source_type: CLIENT_TYPE.to_string(),
            device: None,
            record: Some(record.to_string()),
        }
    }

    /// Full `<definition>` document holding this datasource.
    pub fn to_xml(&self) -> Result<String, CreatorError> {
        let fail = |e| parse_error(&self.name, e);
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
            .map_err(fail)?;
        writer
            .write_event(Event::Start(BytesStart::new("definition")))
            .map_err(fail)?;

        let datasource = BytesStart::new("datasource").with_attributes([
            ("name", self.name.as_str()),
            ("type", self.source_type.as_str()),
        ]);
        writer.write_event(Event::Start(datasource)).map_err(fail)?;

        if let Some(device) = &self.device {
            let element = BytesStart::new("device").with_attributes([
                ("hostname", device.hostname.as_str()),
                ("member", device.member.as_str()),
                ("name", device.device.as_str()),
                ("port", device.port.as_str()),
            ]);
            writer.write_event(Event::Empty(element)).map_err(fail)?;
        }
        if let Some(record) = &self.record {
            let element = BytesStart::new("record").with_attributes([("name", record.as_str())]);
            writer.write_event(Event::Empty(element)).map_err(fail)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("datasource")))
            .map_err(fail)?;
        writer
            .write_event(Event::End(BytesEnd::new("definition")))
            .map_err(fail)?;

        let bytes = writer.into_inner().into_inner();
        let mut xml = String::from_utf8(bytes).map_err(|e| parse_error(&self.name, e))?;
        xml.push('\n');
        Ok(xml)
    }
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Result<Option<String>, String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_error(source_name: &str, reason: impl ToString) -> CreatorError {
    CreatorError::Parse {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    }
}

fn datasource_start(element: &BytesStart<'_>, source_name: &str) -> Result<DataSourceDef, CreatorError> {
    let get = |key: &str| {
        attribute(element, key)
            .map(|value| value.unwrap_or_default())
            .map_err(|e| parse_error(source_name, e))
    };
    Ok(DataSourceDef {
        name: get("name")?,
        source_type: get("type")?,
        device: None,
        record: None,
    })
}

fn tango_source(element: &BytesStart<'_>, source_name: &str) -> Result<TangoSource, CreatorError> {
    let get = |key: &str| {
        attribute(element, key)
            .map(|value| value.unwrap_or_default())
            .map_err(|e| parse_error(source_name, e))
    };
    Ok(TangoSource {
        device: get("name")?,
        hostname: get("hostname")?,
        port: get("port")?,
        member: get("member")?,
    })
}

/// Every datasource defined in a document, nested ones included.
///
/// `source_name` only labels parse errors.
pub fn parse_datasources(xml: &str, source_name: &str) -> Result<Vec<DataSourceDef>, CreatorError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut open: Vec<DataSourceDef> = Vec::new();
    let mut found = Vec::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| parse_error(source_name, e))?
        {
            Event::Start(element) if element.name().as_ref() == b"datasource" => {
                open.push(datasource_start(&element, source_name)?);
            }
            Event::Empty(element) if element.name().as_ref() == b"datasource" => {
                found.push(datasource_start(&element, source_name)?);
            }
            Event::End(element) if element.name().as_ref() == b"datasource" => {
                if let Some(def) = open.pop() {
                    found.push(def);
                }
            }
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref() == b"device" =>
            {
                if let Some(current) = open.last_mut() {
                    current.device = Some(tango_source(&element, source_name)?);
                }
            }
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref() == b"record" =>
            {
                if let Some(current) = open.last_mut() {
                    current.record =
                        attribute(&element, "name").map_err(|e| parse_error(source_name, e))?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(found)
}

/// Names of all `<record>` elements in document order, without duplicates.
pub fn record_names(xml: &str, source_name: &str) -> Result<Vec<String>, CreatorError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut names: Vec<String> = Vec::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| parse_error(source_name, e))?
        {
            Event::Start(element) | Event::Empty(element)
                if element.name().as_ref() == b"record" =>
            {
                let name = attribute(&element, "name").map_err(|e| parse_error(source_name, e))?;
                if let Some(name) = name {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(names)
}
