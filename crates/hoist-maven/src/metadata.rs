//! Artifact-level `maven-metadata.xml`: parse, merge staged versions, write.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use hoist_core::version;
use hoist_util::errors::HoistError;

/// File name of repository metadata, next to the version directories.
pub const METADATA_FILE: &str = "maven-metadata.xml";

/// Artifact-level Maven metadata listing available versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenMetadata {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Vec<String>,
    pub last_updated: Option<String>,
}

impl MavenMetadata {
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        Self {
            group_id: Some(group_id.to_string()),
            artifact_id: Some(artifact_id.to_string()),
            ..Default::default()
        }
    }

    /// Merge newly deployed versions, keeping first-seen order.
    ///
    /// `latest` becomes the last merged version and `release` the last
    /// merged non-snapshot one; an existing `release` survives a
    /// snapshot-only merge.
    pub fn merge<'a>(&mut self, deployed: impl IntoIterator<Item = &'a str>, timestamp: &str) {
        for v in deployed {
            if !self.versions.iter().any(|existing| existing == v) {
                self.versions.push(v.to_string());
            }
            self.latest = Some(v.to_string());
            if !version::is_snapshot(v) {
                self.release = Some(v.to_string());
            }
        }
        self.last_updated = Some(timestamp.to_string());
    }

    /// Serialize as an indented XML document.
    pub fn to_xml(&self) -> Result<String, HoistError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        emit(&mut writer, Event::Start(BytesStart::new("metadata")))?;
        optional_element(&mut writer, "groupId", self.group_id.as_deref())?;
        optional_element(&mut writer, "artifactId", self.artifact_id.as_deref())?;

        emit(&mut writer, Event::Start(BytesStart::new("versioning")))?;
        optional_element(&mut writer, "latest", self.latest.as_deref())?;
        optional_element(&mut writer, "release", self.release.as_deref())?;
        emit(&mut writer, Event::Start(BytesStart::new("versions")))?;
        for v in &self.versions {
            text_element(&mut writer, "version", v)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("versions")))?;
        optional_element(&mut writer, "lastUpdated", self.last_updated.as_deref())?;
        emit(&mut writer, Event::End(BytesEnd::new("versioning")))?;

        emit(&mut writer, Event::End(BytesEnd::new("metadata")))?;

        let mut xml = String::from_utf8(writer.into_inner()).map_err(|e| HoistError::Generic {
            message: format!("maven-metadata.xml is not UTF-8: {e}"),
        })?;
        xml.push('\n');
        Ok(xml)
    }
}

/// `lastUpdated` timestamp format: `yyyyMMddHHmmss` in UTC.
pub fn timestamp_now() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), HoistError> {
    writer.write_event(event).map_err(|e| HoistError::Generic {
        message: format!("Failed to write maven-metadata.xml: {e}"),
    })
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<(), HoistError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(value)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn optional_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    value: Option<&str>,
) -> Result<(), HoistError> {
    match value {
        Some(v) => text_element(writer, name, v),
        None => Ok(()),
    }
}

/// Parse an artifact-level `maven-metadata.xml` that lists available versions.
pub fn parse_metadata(xml: &str) -> miette::Result<MavenMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut meta = MavenMetadata::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(String::from_utf8_lossy(e.name().as_ref()).to_string());
                text.clear();
            }
            Ok(Event::Text(ref e)) => {
                text = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(_)) => {
                let value = std::mem::take(&mut text);
                match path.join(">").as_str() {
                    "metadata>groupId" => meta.group_id = Some(value),
                    "metadata>artifactId" => meta.artifact_id = Some(value),
                    "metadata>versioning>latest" => meta.latest = Some(value),
                    "metadata>versioning>release" => meta.release = Some(value),
                    "metadata>versioning>versions>version" => meta.versions.push(value),
                    "metadata>versioning>lastUpdated" => meta.last_updated = Some(value),
                    _ => {}
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(HoistError::Generic {
                    message: format!("Failed to parse maven-metadata.xml: {e}"),
                }
                .into());
            }
            _ => {}
        }
    }

    Ok(meta)
}
