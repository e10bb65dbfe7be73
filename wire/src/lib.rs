//! Wire-level framing: the two record formats every message on the
//! connection is carried in.
//!
//! [`typed`] is the unauthenticated, length-prefixed typed-record format
//! used before a session key exists. [`authed`] is the encrypt-then-MAC
//! boxed-packet format used for everything after the handshake
//! completes.

mod authed;
mod typed;

pub use authed::{
    read_authed, read_authed_with_options, write_authed, FramingOptions,
    LEGACY_MAX_PAYLOAD_SIZE, MAX_PAYLOAD_SIZE,
};
pub use typed::{read_typed_data, read_typed_scalar, write_typed_data, write_typed_scalar, TypedTag};
