//! Pluggable serialization codec
//!
//! The dispatch engine never touches a wire format directly. Responses are
//! encoded, and request bodies decoded, through a [`Codec`]. [`JsonCodec`] is
//! the default.
//!
//! ```rust
//! use rest_resource::codec::{Codec, JsonCodec};
//!
//! let bytes = JsonCodec.encode(&vec![1, 2]).unwrap();
//! assert_eq!(bytes, b"[1,2]");
//!
//! let decoded: Vec<u32> = JsonCodec.decode(&bytes).unwrap();
//! assert_eq!(decoded, vec![1, 2]);
//! ```

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

/// Serialization codec used for request and response bodies
pub trait Codec: Send + Sync + 'static {
    /// Value of the `Content-Type` header for encoded bodies
    fn content_type(&self) -> &'static str;

    /// Encode a value, failing with [`Error::Serialization`]
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized;

    /// Decode a request body, failing with [`Error::Deserialization`]
    fn decode<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned;
}

/// JSON codec backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
