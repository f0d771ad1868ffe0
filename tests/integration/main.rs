//! Integration tests: whole-engine runs driven through the public API.

mod scripted_random;
mod simulation;
