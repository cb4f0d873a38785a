#![no_std]

//! A heuristic decoder for BAOS (Bus Access and Object Server) telegrams
//! carried in FT 1.2 serial frames, as found in USB bulk transfers.
//!
//! Given an arbitrary byte buffer, the decoder locates a candidate frame
//! within its first few bytes, checks the frame for integrity, and decodes the
//! BAOS payload into a stream of tagged fields published to a [`FieldSink`].
//!
//! Most users should begin with the functions in the [`avec`] module and the
//! [`FieldSink`](macro@sink::FieldSink) derive macro. If these prove
//! insufficient, drive the finite-state machine in the [`sans`] module
//! directly.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable the owned telegram tree (default).
//! - `defmt`: implement `defmt::Format` for wire enumerations and diagnostics.
//!
//! [`FieldSink`]: sink::FieldSink

pub mod avec;
pub mod sans;
pub mod sink;
