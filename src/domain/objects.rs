//! Helpers over the lopdf object model.

use lopdf::{Dictionary, Document, Object, StringFormat};

/// Upper bound on chained indirect references followed by [`dereference`].
const MAX_REFERENCE_CHAIN: usize = 32;

/// Follow indirect references until a direct object is reached.
///
/// Returns `None` for dangling references or chains longer than
/// [`MAX_REFERENCE_CHAIN`].
pub fn dereference<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_CHAIN {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

/// Dereferenced dictionary entry, if present and a dictionary.
pub fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    let obj = dict.get(key).ok()?;
    dereference(doc, obj)?.as_dict().ok()
}

/// The document catalog (`/Root`), if accessible.
pub fn catalog(doc: &Document) -> Option<&Dictionary> {
    let root = doc.trailer.get(b"Root").ok()?;
    dereference(doc, root)?.as_dict().ok()
}

/// Human-readable kind of a PDF object, for diagnostics.
pub fn object_kind(obj: &Object) -> &'static str {
    match obj {
        Object::Null => "null",
        Object::Boolean(_) => "boolean",
        Object::Integer(_) => "integer",
        Object::Real(_) => "real",
        Object::Name(_) => "name",
        Object::String(..) => "string",
        Object::Array(_) => "array",
        Object::Dictionary(_) => "dictionary",
        Object::Stream(_) => "stream",
        Object::Reference(_) => "reference",
    }
}

/// Lossy display form of a byte-string key.
pub fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// Decode a PDF text string.
///
/// UTF-16BE with byte order mark, otherwise UTF-8, otherwise
/// PDFDocEncoding approximated as Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Encode a title as a PDF text string.
///
/// ASCII stays a literal string; anything else becomes UTF-16BE with BOM.
pub fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
