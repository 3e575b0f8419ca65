// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums, and traits describing the
// classification task itself.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything in here can be unit tested without a tensor backend.

// One tokenised, labelled text record
pub mod example;

// True-label × predicted-label count table
pub mod confusion;

// Typed failures of the data pipeline
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
