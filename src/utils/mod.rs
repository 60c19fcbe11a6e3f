// Shared helpers for stream access
pub mod io;
