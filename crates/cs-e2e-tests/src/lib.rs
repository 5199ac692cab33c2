//! End-to-end tests live in `tests/`: log lines go through the format chain
//! into a store, then back out through the query language and stats engine.
