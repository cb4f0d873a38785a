//! Internal finite-state machine for implementing decoders.
//!
//! This module is intended for applications that need fine control over the
//! decoding process, such as hosts interleaving several heuristic decoders.
//! See [`crate::avec`] for implementations covering common decoding patterns.
//!
//! # Architecture
//!
//! Decoding one buffer walks through a fixed sequence of states:
//!
//! ```text
//! Scanning -> FoundFrame -> HeaderDecoded -> Payload -> PayloadDecoded -> TrailerChecked -> Summary
//!                                        \___________________/
//!                                        (unknown sub-service)
//! ```
//!
//! Every state is represented by a non-copy token. Transition to the next
//! state by calling the token's `advance` method with the input buffer and a
//! [`FieldSink`](crate::sink::FieldSink). This publishes the fields covered by
//! that state and returns the successor token.
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed. Scanning is the only transition that can fail: every later
//! state degrades gracefully on truncated input, publishing fewer fields
//! rather than reading beyond the end of the buffer. Integrity problems are
//! published as diagnostics and never end decoding early.

/// Define a `#[repr]` enumeration of wire codes, with lookup and labels.
macro_rules! wire_enum {
    (
        $(#[$attr:meta])*
        pub enum $name:ident: $repr:ident {
            $($(#[$vattr:meta])* $variant:ident = $code:literal => $label:literal,)*
        }
    ) => {
        $(#[$attr])*
        #[repr($repr)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, zerocopy::TryFromBytes)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $name {
            $($(#[$vattr])* $variant = $code,)*
        }

        impl $name {
            /// Look up the variant for a wire code.
            pub fn from_code(code: $repr) -> Option<Self> {
                zerocopy::try_transmute!(code).ok()
            }

            /// The wire code of this variant.
            pub const fn code(self) -> $repr {
                self as $repr
            }

            /// Human-readable name of this variant.
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }

        impl crate::sink::FromValue for $name {
            fn from_value(value: &crate::sink::Value<'_>) -> Option<Self> {
                Self::from_code(<$repr as crate::sink::FromValue>::from_value(value)?)
            }
        }
    };
}

pub mod check;
pub mod datapoint;
pub mod frame;
pub mod header;
pub mod item;
pub mod payload;
pub mod scan;
pub mod stream;
pub mod trailer;

/// Entrypoint to the finite-state machine.
pub type Decoder = scan::Scanning;
