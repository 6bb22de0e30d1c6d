//! Engine telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside scheduling decisions (Cursor, Scheduler, Ducking).
//! It exists solely for observability and verification.
//!
//! # PRIVACY INVARIANT
//! Telemetry events must **NEVER** contain dialogue text or audio samples.
//! Only segment ids, source handles and numbers (rates, counts, seconds) are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;
