//! Parley Codec library.
//!
//! Compact, typed, self-describing state codec for chat-platform component
//! identifiers. The platform caps every component's opaque identifier at 100
//! characters and offers no server-side session storage, so all state needed
//! to resume a multi-step flow is packed into that string and decoded later,
//! possibly on a different process instance.
//!
//! ## Structure
//!
//! - `value` - Closed value union carried by every field
//! - `field` - Field kinds: one typed compress/decompress unit each
//! - `wire` - Delimited token list join/split with escaping
//! - `schema` / `record` - Ordered schemas and sparse records over them
//! - `pack` / `state` - Identifier packing and the prefix-tagged view state

pub mod base36;
pub mod error;
pub mod field;
pub mod pack;
pub mod record;
pub mod schema;
pub mod state;
pub mod value;
pub mod wire;

pub use error::CodecError;
pub use field::FieldKind;
pub use record::Record;
pub use schema::{Field, Schema};
pub use state::{ViewState, MAX_WIRE_ID_CHARS, PREFIX_SEPARATOR};
pub use value::Value;
