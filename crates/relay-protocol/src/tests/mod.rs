//! Unit tests for `relay_protocol`.
