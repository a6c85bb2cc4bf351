//! Shared primitive types used across every desk.

/// Join key for transaction rows. Kept as text so ledgers with
/// alphanumeric references reconcile the same way as numeric ones.
pub type TransactionId = String;

/// Stable customer identifier as it appears in uploaded files.
pub type CustomerId = String;

/// Identifier of one isolated browser/IPC session.
pub type SessionId = String;

/// Monetary amount in the ledger currency (₹).
pub type Amount = f64;
