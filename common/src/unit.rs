//! Marker types describing what a typed value stands for.

/// Marker of an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker of an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker of a value expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
