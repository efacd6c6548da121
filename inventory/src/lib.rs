// Life of a request:
// 1. The binary parses a command
// 2. The store validates the record and its category name
// 3. For reads:
//     - Load every category file into one ordered index
//     - Look up, scan by name, or drain into a display sequence
//    For mutations:
//     - Load the affected category into a fresh index
//     - Insert, replace or remove
//     - Rewrite the whole category file in id order
//
// System components:
//  - Ordered index (binary search tree keyed by id)
//  - Record codec and category files
//  - Display ordering (stable merge sort)
#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod config;
pub mod listing;
pub mod simulation;
pub mod storage;
#[cfg(test)]
mod testing;
pub mod types;
