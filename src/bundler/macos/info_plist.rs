//! `Info.plist` rendering.
//!
//! The descriptor has a fixed key set:
//!
//! | Key | Value |
//! |-----|-------|
//! | `CFBundleExecutable` | executable name |
//! | `CFBundleIdentifier` | bundle identifier |
//! | `CFBundleName` | display name |
//! | `CFBundleIconFile` | `AppIcon` |
//! | `CFBundleShortVersionString` | version |
//! | `CFBundleInfoDictionaryVersion` | `6.0` |
//! | `CFBundlePackageType` | `APPL` |
//! | `LSMinimumSystemVersion` | minimum macOS version |
//! | `NSHighResolutionCapable` | `true` |
//! | `CFBundleDocumentTypes` | one dictionary per document type |

use crate::bundler::error::{Error, Result};
use crate::bundler::settings::{DocumentType, ICON_CONTAINER_NAME, PackageConfig};
use plist::{Dictionary, Value};

/// Renders the descriptor for `config` as an XML property list.
///
/// Keys are emitted in a fixed order and document-type sets are sorted, so
/// equal configs always render byte-identical text.
pub fn render(config: &PackageConfig) -> Result<String> {
    let mut dict = Dictionary::new();

    dict.insert("CFBundleExecutable".into(), config.executable_name().into());
    dict.insert("CFBundleIdentifier".into(), config.identifier().into());
    dict.insert("CFBundleName".into(), config.app_name().into());
    dict.insert("CFBundleIconFile".into(), ICON_CONTAINER_NAME.into());
    dict.insert("CFBundleShortVersionString".into(), config.version().into());
    dict.insert("CFBundleInfoDictionaryVersion".into(), "6.0".into());
    dict.insert("CFBundlePackageType".into(), "APPL".into());
    dict.insert(
        "LSMinimumSystemVersion".into(),
        config.minimum_system_version().into(),
    );
    dict.insert("NSHighResolutionCapable".into(), true.into());
    dict.insert(
        "CFBundleDocumentTypes".into(),
        Value::Array(config.document_types().iter().map(document_type).collect()),
    );

    let mut xml = Vec::new();
    Value::Dictionary(dict).to_writer_xml(&mut xml)?;
    String::from_utf8(xml)
        .map_err(|e| Error::GenericError(format!("Info.plist is not valid UTF-8: {e}")))
}

fn document_type(doc: &DocumentType) -> Value {
    let mut dict = Dictionary::new();
    dict.insert(
        "CFBundleTypeExtensions".into(),
        string_array(doc.extensions.iter()),
    );
    dict.insert("CFBundleTypeName".into(), doc.name.as_str().into());
    dict.insert("CFBundleTypeRole".into(), doc.role.as_str().into());
    dict.insert(
        "LSItemContentTypes".into(),
        string_array(doc.content_types.iter()),
    );
    Value::Dictionary(dict)
}

fn string_array<'a>(items: impl Iterator<Item = &'a String>) -> Value {
    Value::Array(items.map(|s| Value::String(s.clone())).collect())
}
