use prost::Message;
use std::collections::BTreeSet;

use crate::chain::proto::{Any, MsgIssue, MSG_ISSUE_TYPE_URL};
use crate::error::{Error, Result};

/// A protobuf message the chain accepts under a fixed type URL
pub trait TypedMessage: Message + Sized {
    const TYPE_URL: &'static str;
}

impl TypedMessage for MsgIssue {
    const TYPE_URL: &'static str = MSG_ISSUE_TYPE_URL;
}

/// Set of message type URLs a signing client is allowed to encode
#[derive(Debug, Clone, Default)]
pub struct Registry {
    type_urls: BTreeSet<String>,
}

impl Registry {
    /// Empty registry, nothing can be encoded until registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the token issuance schema registered
    pub fn with_asset_messages() -> Self {
        let mut registry = Self::new();
        registry.register::<MsgIssue>();
        registry
    }

    pub fn register<M: TypedMessage>(&mut self) {
        self.register_type_url(M::TYPE_URL);
    }

    pub fn register_type_url(&mut self, type_url: impl Into<String>) {
        self.type_urls.insert(type_url.into());
    }

    pub fn is_registered(&self, type_url: &str) -> bool {
        self.type_urls.contains(type_url)
    }

    /// Fail with `SchemaNotRegistered` for an unknown type URL
    pub fn ensure_registered(&self, type_url: &str) -> Result<()> {
        if self.is_registered(type_url) {
            Ok(())
        } else {
            Err(Error::SchemaNotRegistered(type_url.to_string()))
        }
    }

    /// Encode a message and wrap it in Any
    pub fn encode<M: TypedMessage>(&self, msg: &M) -> Result<Any> {
        self.ensure_registered(M::TYPE_URL)?;
        Ok(Any {
            type_url: M::TYPE_URL.to_string(),
            value: msg.encode_to_vec(),
        })
    }
}
