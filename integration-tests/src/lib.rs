//! No library surface of its own — this crate only exists to hold
//! cross-crate scenario tests under `tests/`.
