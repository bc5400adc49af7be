//! Domain atoms for the pinboard backend.
//!
//! Each atom is split into `model` (wire and domain types), `service` (pure
//! domain logic over an injected store) and `http` (per-endpoint handlers that
//! turn service results into lambda responses). Atoms never construct their own
//! clients; callers pass them in.

pub mod media;
