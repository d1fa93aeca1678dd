use crate::value::Value;
use std::fmt::{self, Display};

///
/// Container
///
/// Named, owner-scoped collection of items. Its canonical key
/// `"{owner}:{name}"` is the membership row key and the prefix of every
/// index row the container owns.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Container {
    owner: Value,
    name: String,
}

impl Container {
    #[must_use]
    pub fn new(owner: impl Into<Value>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub const fn owner(&self) -> &Value {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.owner, self.name)
    }

    /// Membership row key.
    #[must_use]
    pub fn row_key(&self) -> Vec<u8> {
        self.key().into_bytes()
    }

    #[must_use]
    pub fn index_key(&self, attribute: &str) -> IndexKey {
        IndexKey::new(self, attribute)
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.name)
    }
}

///
/// IndexKey
///
/// One sorted index: a container crossed with an attribute name.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IndexKey {
    container_key: String,
    attribute: String,
}

impl IndexKey {
    #[must_use]
    pub fn new(container: &Container, attribute: impl Into<String>) -> Self {
        Self {
            container_key: container.key(),
            attribute: attribute.into(),
        }
    }

    #[must_use]
    pub fn container_key(&self) -> &str {
        &self.container_key
    }

    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Index row key, `"{container_key}:{attribute}"`.
    #[must_use]
    pub fn row_key(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.container_key, self.attribute)
    }
}

///
/// TESTS
///
