/// Native module contains implementations of core traits
/// that talk to the local machine directly: the filesystem for
/// submissions and a locally installed interpreter for running them.
pub mod materializer;
pub mod runner;
