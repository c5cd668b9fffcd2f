//! # tablebot-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationBackend` / `AutomationSession` — the browser automation capability
//!   - `CredentialSource` — where session secrets come from
//! - Define **driving/inbound** use-cases:
//!   - `SessionController` — one request, one session, one step sequence
//!   - `LineDispatcher` — the line protocol, one request at a time
//! - Provide **in-process infrastructure** that doesn't need adapters
//!   (process environment lookup)
//!
//! ## Dependency rule
//! Depends on `tablebot-domain` only (plus `tokio` for IO traits, channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod environment;
pub mod ports;
pub mod services;
