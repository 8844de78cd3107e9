use std::{fmt, sync::Arc};

/// Key identifying content inside one asset type's namespace.
///
/// Addresses are normalized on construction: whitespace around the address is
/// trimmed, `\` is treated as `/`, empty and `.` components are dropped and
/// `..` removes the component before it. `..` never climbs above the root, so
/// an address cannot name anything outside of it. Two spellings of the same
/// location therefore compare equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Arc<str>);

impl Address {
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw).into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(index) => &self.0[index + 1..],
            None => &self.0,
        }
    }
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        match file_name.rfind('.') {
            Some(0) | None => None,
            Some(index) => Some(&file_name[index + 1..]),
        }
    }
    /// The directory part of the address, empty for top level content
    pub fn parent(&self) -> Address {
        match self.0.rfind('/') {
            Some(index) => Self(self.0[..index].into()),
            None => Self("".into()),
        }
    }
    /// Resolves a reference found inside the content at this address.
    /// References starting with `/` are taken from the root, everything else
    /// is relative to this address' directory.
    pub fn sibling(&self, reference: &str) -> Address {
        let reference = reference.trim();
        let parent = self.parent();
        if reference.starts_with('/') || reference.starts_with('\\') || parent.is_empty() {
            Address::new(reference)
        } else {
            Address::new(&format!("{}/{}", parent.as_str(), reference))
        }
    }
}

fn normalize(raw: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    for component in raw.trim().split(|c: char| c == '/' || c == '\\') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            _ => components.push(component),
        }
    }
    components.join("/")
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Address::new(raw)
    }
}
impl From<String> for Address {
    fn from(raw: String) -> Self {
        Address::new(&raw)
    }
}
impl From<&String> for Address {
    fn from(raw: &String) -> Self {
        Address::new(raw)
    }
}
impl From<&Address> for Address {
    fn from(address: &Address) -> Self {
        address.clone()
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:?})", &*self.0)
    }
}
