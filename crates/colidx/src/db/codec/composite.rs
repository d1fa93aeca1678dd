use crate::{
    db::codec::{
        CodecError,
        ordered::{decode_component, push_component},
    },
    value::Value,
};

/// Appended to an encoded prefix to sort after every key that extends it.
/// Every component starts with a tag byte below this value.
const PREFIX_END: u8 = 0xFF;

///
/// CompositeKey
///
/// Ordered tuple of values encoded as concatenated self-delimiting
/// components. Comparing two encoded keys byte-wise compares the tuples
/// componentwise, so the store's native column order does all the work.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CompositeKey {
    components: Vec<Value>,
}

impl CompositeKey {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    #[must_use]
    pub const fn from_components(components: Vec<Value>) -> Self {
        Self { components }
    }

    /// Append one component, builder style.
    #[must_use]
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.components.push(value.into());
        self
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.components.push(value.into());
    }

    #[must_use]
    pub fn components(&self) -> &[Value] {
        &self.components
    }

    #[must_use]
    pub fn into_components(self) -> Vec<Value> {
        self.components
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.components.get(position)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for component in &self.components {
            push_component(&mut out, component);
        }

        out
    }

    /// First byte string ordered after every key that starts with this one.
    #[must_use]
    pub fn prefix_end(&self) -> Vec<u8> {
        let mut out = self.encode();
        out.push(PREFIX_END);

        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut components = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let (value, consumed) = decode_component(&bytes[offset..])?;
            components.push(value);
            offset += consumed;
        }

        Ok(Self { components })
    }

    /// Decode and require exactly `arity` components.
    pub fn decode_exact(bytes: &[u8], arity: usize) -> Result<Self, CodecError> {
        let key = Self::decode(bytes)?;
        if key.len() != arity {
            return Err(CodecError::Arity {
                expected: arity,
                found: key.len(),
            });
        }

        Ok(key)
    }
}

impl From<Vec<Value>> for CompositeKey {
    fn from(components: Vec<Value>) -> Self {
        Self::from_components(components)
    }
}
