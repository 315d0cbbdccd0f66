use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::format::format_distance;
use super::haversine::haversine_meters;
use crate::error::GeolocationError;
use crate::types::{GeoPoint, UnitSystem};

/// Translation key of the message shown when the position is unavailable.
pub const LOCATION_ERROR_KEY: &str = "location_error";

/// Single-shot access to the device position.
pub trait Geolocator: Send + Sync {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<GeoPoint, GeolocationError>> + Send;
}

/// Answers whether the local session holds an auth token. The token value
/// itself is never read.
pub trait SessionStore: Send + Sync {
    fn has_auth_token(&self) -> bool;
}

/// Looks up a localized message by key.
pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

impl SessionStore for bool {
    fn has_auth_token(&self) -> bool {
        *self
    }
}

/// A [`Geolocator`] pinned to a known position.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub GeoPoint);

impl Geolocator for FixedPosition {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
        Ok(self.0)
    }
}

/// Computes and formats the distance from the device to a target point.
pub struct DistanceCalculator<G, S> {
    geolocator: G,
    session: S,
    locale: String,
}

impl<G, S> DistanceCalculator<G, S>
where
    G: Geolocator,
    S: SessionStore,
{
    pub fn new(geolocator: G, session: S, locale: impl Into<String>) -> Self {
        Self {
            geolocator,
            session,
            locale: locale.into(),
        }
    }

    pub fn units(&self) -> UnitSystem {
        UnitSystem::from_locale(&self.locale)
    }

    /// Distance from the current position to `target`, formatted for the
    /// locale.
    ///
    /// Resolves to an empty string without a session and to the translated
    /// `location_error` message when no position can be acquired. The
    /// position lookup has no timeout.
    pub async fn calculate<T>(&self, target: GeoPoint, translator: &T) -> String
    where
        T: Translator + ?Sized,
    {
        if !self.session.has_auth_token() {
            tracing::debug!("no auth token, distance suppressed");
            return String::new();
        }

        let here = match self.geolocator.current_position().await {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(error = %e, "could not acquire device position");
                return translator.translate(LOCATION_ERROR_KEY);
            }
        };

        let meters = haversine_meters(here, target);
        let units = self.units();
        tracing::debug!(meters, units = units.as_str(), "computed distance");
        format_distance(meters, units)
    }
}

impl<G, S> DistanceCalculator<G, S>
where
    G: Geolocator + 'static,
    S: SessionStore + 'static,
{
    /// Run [`calculate`](Self::calculate) on the runtime.
    ///
    /// Dropping the returned handle aborts the calculation, so a position
    /// that arrives after the owner is gone is discarded.
    pub fn spawn<T>(self: Arc<Self>, target: GeoPoint, translator: T) -> PendingDistance
    where
        T: Translator + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move { self.calculate(target, &translator).await });
        PendingDistance {
            handle: Some(handle),
        }
    }
}

/// In-flight distance calculation. Aborted on drop.
pub struct PendingDistance {
    handle: Option<JoinHandle<String>>,
}

impl PendingDistance {
    /// Wait for the formatted distance.
    ///
    /// `None` only if the task was cancelled or panicked.
    pub async fn resolve(mut self) -> Option<String> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(error = %e, "distance task did not complete");
                None
            }
        }
    }
}

impl Drop for PendingDistance {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
