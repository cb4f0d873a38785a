//! Convenience interfaces for common decoding patterns.
//!
//! [`decode_slice`] runs the whole finite-state machine over one buffer,
//! publishing to any [`FieldSink`](crate::sink::FieldSink). Receivers of a
//! known shape can be derived with the
//! [`FieldSink`](macro@crate::sink::FieldSink) macro.
//!
//! With the `std` feature, [`decode_tree`] collects the published fields into
//! an owned, strongly-typed [`Telegram`](tree::Telegram).

pub mod slice;
#[cfg(feature = "std")]
pub mod tree;

pub use slice::decode as decode_slice;
#[cfg(feature = "std")]
pub use tree::decode as decode_tree;
