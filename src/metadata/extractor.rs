//! Producer/Creator extraction from the PDF Info dictionary

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

use crate::{
    error::{Error, Result},
    types::DocumentMetadata,
};

/// `Ok(None)` when the trailer has no Info dictionary or it is empty
pub fn extract_metadata(path: &Path) -> Result<Option<DocumentMetadata>> {
    let document = Document::load(path)
        .map_err(|e| Error::MetadataError(format!("{}: {}", path.display(), e)))?;
    read_info(&document)
}

fn read_info(document: &Document) -> Result<Option<DocumentMetadata>> {
    let info_object = match document.trailer.get(b"Info") {
        Ok(object) => object,
        Err(_) => {
            debug!("no Info entry in trailer");
            return Ok(None);
        }
    };

    let info = match resolve(document, info_object)? {
        Object::Dictionary(dict) => dict,
        other => {
            return Err(Error::MetadataError(format!(
                "Info is not a dictionary: {:?}",
                other
            )))
        }
    };

    if info.len() == 0 {
        return Ok(None);
    }

    Ok(Some(DocumentMetadata {
        producer: text_entry(document, info, b"Producer"),
        creator: text_entry(document, info, b"Creator"),
    }))
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => document
            .get_object(*id)
            .map_err(|e| Error::MetadataError(format!("broken Info reference {:?}: {}", id, e))),
        other => Ok(other),
    }
}

fn text_entry(document: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let object = dict.get(key).ok()?;
    match resolve(document, object).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Decodes a PDF text string: UTF-16BE with BOM, otherwise byte-per-char
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
