use async_trait::async_trait;

use crate::model::Coordinates;

/// One-shot position lookup. May never answer, or answer `None` when declined.
#[async_trait]
pub trait GeolocationSource: Send + Sync {
    async fn locate(&self) -> Option<Coordinates>;
}

/// A position known up front, e.g. a configured home location.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl GeolocationSource for FixedLocation {
    async fn locate(&self) -> Option<Coordinates> {
        Some(self.0)
    }
}

/// Geolocation unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationSource for NoGeolocation {
    async fn locate(&self) -> Option<Coordinates> {
        None
    }
}
