//! Platform position lookup.

use async_trait::async_trait;

use crate::{error::LocationError, model::Coordinates};

#[async_trait]
pub trait Geolocation: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// A position supplied up front, e.g. from command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocation for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}
