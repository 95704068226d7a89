//! Decoding and validation of user action payloads.
//!
//! `decode` turns untrusted JSON into the typed model, naming the JSON path of
//! whatever is wrong; `rules` holds the limits applied after decoding.

pub mod decode;
pub mod rules;

pub use decode::{decode_attributes, decode_payload, decode_request_payload, DecodeError};
pub use validator::Validate;
