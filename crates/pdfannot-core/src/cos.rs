//! Shared dictionary view over the PDF object graph
//!
//! `DocumentObject` is a handle to a `lopdf::Dictionary`. Cloning the handle
//! does not copy the dictionary: every clone reads and writes the same
//! entries, so several wrappers can look at one stored object.

use lopdf::{Dictionary, Object, StringFormat};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

#[derive(Clone, Default)]
pub struct DocumentObject {
    inner: Rc<RefCell<Dictionary>>,
}

impl DocumentObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dictionary(dict: Dictionary) -> Self {
        Self {
            inner: Rc::new(RefCell::new(dict)),
        }
    }

    /// Copy of the current entries, e.g. for storing back into a `lopdf::Document`.
    pub fn to_dictionary(&self) -> Dictionary {
        self.inner.borrow().clone()
    }

    /// True when both handles view the same stored dictionary.
    pub fn ptr_eq(&self, other: &DocumentObject) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().has(key.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Object> {
        self.inner.borrow().get(key.as_bytes()).ok().cloned()
    }

    pub fn set<V: Into<Object>>(&self, key: &str, value: V) {
        self.inner.borrow_mut().set(key, value);
    }

    pub fn remove(&self, key: &str) -> Option<Object> {
        self.inner.borrow_mut().remove(key.as_bytes())
    }

    /// Text value of a string entry. Entries of any other type read as absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.inner.borrow().get(key.as_bytes()) {
            Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    /// Store a text string; `None` removes the entry.
    pub fn set_string(&self, key: &str, value: Option<&str>) {
        match value {
            Some(text) => self.set(
                key,
                Object::String(encode_text_string(text), StringFormat::Literal),
            ),
            None => {
                self.remove(key);
            }
        }
    }

    pub fn get_name(&self, key: &str) -> Option<String> {
        match self.inner.borrow().get(key.as_bytes()) {
            Ok(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }

    pub fn set_name(&self, key: &str, name: &str) {
        self.set(key, Object::Name(name.as_bytes().to_vec()));
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.inner.borrow().get(key.as_bytes()) {
            Ok(Object::Integer(value)) => *value,
            Ok(Object::Real(value)) => *value as i64,
            _ => default,
        }
    }

    pub fn set_int(&self, key: &str, value: i64) {
        self.set(key, Object::Integer(value));
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.inner
            .borrow()
            .get(key.as_bytes())
            .ok()
            .and_then(number_value)
            .unwrap_or(default)
    }

    pub fn set_float(&self, key: &str, value: f32) {
        self.set(key, Object::Real(value));
    }

    /// Numbers of an array entry. Non-numeric elements make the whole entry unreadable.
    pub fn get_float_array(&self, key: &str) -> Option<Vec<f32>> {
        match self.inner.borrow().get(key.as_bytes()) {
            Ok(Object::Array(items)) => items.iter().map(number_value).collect(),
            _ => None,
        }
    }

    pub fn set_float_array(&self, key: &str, values: &[f32]) {
        let items = values.iter().map(|v| Object::Real(*v)).collect();
        self.set(key, Object::Array(items));
    }

    pub fn get_dictionary(&self, key: &str) -> Option<Dictionary> {
        match self.inner.borrow().get(key.as_bytes()) {
            Ok(Object::Dictionary(dict)) => Some(dict.clone()),
            _ => None,
        }
    }

    pub fn set_dictionary(&self, key: &str, dict: Dictionary) {
        self.set(key, Object::Dictionary(dict));
    }
}

impl From<Dictionary> for DocumentObject {
    fn from(dict: Dictionary) -> Self {
        Self::from_dictionary(dict)
    }
}

impl fmt::Debug for DocumentObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dict = self.inner.borrow();
        let keys: Vec<String> = dict
            .iter()
            .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
            .collect();
        f.debug_struct("DocumentObject").field("keys", &keys).finish()
    }
}

pub(crate) fn number_value(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(v) => Some(*v as f32),
        Object::Real(v) => Some(*v),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when it starts with a BOM, Latin-1 otherwise.
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&UTF16BE_BOM) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

pub(crate) fn encode_text_string(text: &str) -> Vec<u8> {
    if !text.starts_with("\u{FE}\u{FF}") && text.chars().all(|c| (c as u32) < 0x100) {
        return text.chars().map(|c| c as u8).collect();
    }
    let mut bytes = UTF16BE_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}
