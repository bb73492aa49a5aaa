//! One-shot device location lookup.
//!
//! A platform backend implements [`LocationSource`] and answers each request
//! through a [`FixSender`], which can resolve only once. [`DeviceLocator`]
//! wraps a source with the permission check and exposes it as a
//! [`LocationProvider`].

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tokio::sync::oneshot;
use tracing::debug;

use crate::model::Coordinate;

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    /// Request a single fix. `None` means no coordinate is available.
    async fn request_location(&self) -> Option<Coordinate>;
}

/// Platform collaborator producing location fixes.
pub trait LocationSource: Send + Sync + Debug {
    fn permission_granted(&self) -> bool;

    /// Start one fix request; the answer goes through `sender`.
    fn request_single_update(&self, sender: FixSender);
}

impl<S: LocationSource + ?Sized> LocationSource for Arc<S> {
    fn permission_granted(&self) -> bool {
        (**self).permission_granted()
    }

    fn request_single_update(&self, sender: FixSender) {
        (**self).request_single_update(sender)
    }
}

/// Resolving half of a single location request.
#[derive(Debug)]
pub struct FixSender(oneshot::Sender<Option<Coordinate>>);

impl FixSender {
    /// Resolve the request. Consumes the sender, so this happens at most once.
    pub fn resolve(self, fix: Option<Coordinate>) {
        if self.0.send(fix).is_err() {
            debug!("location fix arrived after the requester stopped waiting");
        }
    }
}

/// Awaiting half of a single location request.
#[derive(Debug)]
pub struct FixReceiver(oneshot::Receiver<Option<Coordinate>>);

impl FixReceiver {
    /// Wait for the fix. A sender dropped without resolving counts as no fix.
    pub async fn wait(self) -> Option<Coordinate> {
        self.0.await.unwrap_or_else(|_| {
            debug!("location source dropped the request without a fix");
            None
        })
    }
}

pub fn location_fix() -> (FixSender, FixReceiver) {
    let (tx, rx) = oneshot::channel();
    (FixSender(tx), FixReceiver(rx))
}

#[derive(Debug, Clone)]
pub struct DeviceLocator<S> {
    source: S,
}

impl<S: LocationSource> DeviceLocator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: LocationSource> LocationProvider for DeviceLocator<S> {
    async fn request_location(&self) -> Option<Coordinate> {
        if !self.source.permission_granted() {
            debug!("location permission not granted; skipping fix request");
            return None;
        }

        let (sender, receiver) = location_fix();
        self.source.request_single_update(sender);
        let fix = receiver.wait().await;

        match fix {
            Some(c) => debug!(latitude = c.latitude, longitude = c.longitude, "got location fix"),
            None => debug!("location source produced no fix"),
        }

        fix
    }
}

/// Provider that always answers with a preconfigured coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Option<Coordinate>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn request_location(&self) -> Option<Coordinate> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeSource {
        granted: bool,
        fix: Option<Coordinate>,
        requests: AtomicUsize,
    }

    impl LocationSource for FakeSource {
        fn permission_granted(&self) -> bool {
            self.granted
        }

        fn request_single_update(&self, sender: FixSender) {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let fix = self.fix;
            tokio::spawn(async move { sender.resolve(fix) });
        }
    }

    /// Holds on to the sender so the test can decide when (or whether) to resolve.
    #[derive(Debug, Default)]
    struct ParkedSource {
        parked: Mutex<Option<FixSender>>,
    }

    impl LocationSource for ParkedSource {
        fn permission_granted(&self) -> bool {
            true
        }

        fn request_single_update(&self, sender: FixSender) {
            *self.parked.lock() = Some(sender);
        }
    }

    #[tokio::test]
    async fn denied_permission_skips_the_source() {
        let source = Arc::new(FakeSource {
            granted: false,
            fix: Some(Coordinate::new(1.0, 2.0)),
            ..Default::default()
        });
        let locator = DeviceLocator::new(source.clone());

        assert_eq!(locator.request_location().await, None);
        assert_eq!(source.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn granted_permission_resolves_with_fix() {
        let source = Arc::new(FakeSource {
            granted: true,
            fix: Some(Coordinate::new(34.05, -118.24)),
            ..Default::default()
        });
        let locator = DeviceLocator::new(source.clone());

        assert_eq!(locator.request_location().await, Some(Coordinate::new(34.05, -118.24)));
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn source_without_fix_resolves_absent() {
        let source = Arc::new(FakeSource { granted: true, ..Default::default() });
        assert_eq!(DeviceLocator::new(source).request_location().await, None);
    }

    #[tokio::test]
    async fn dropped_sender_resolves_absent() {
        let source = Arc::new(ParkedSource::default());
        let locator = DeviceLocator::new(source.clone());

        let pending = tokio::spawn(async move { locator.request_location().await });
        while source.parked.lock().is_none() {
            tokio::task::yield_now().await;
        }
        drop(source.parked.lock().take());

        assert_eq!(pending.await.expect("task should not panic"), None);
    }

    #[tokio::test]
    async fn fix_resolves_once() {
        let (sender, receiver) = location_fix();
        sender.resolve(Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(receiver.wait().await, Some(Coordinate::new(1.0, 1.0)));
    }

    #[tokio::test]
    async fn fixed_location_returns_its_coordinate() {
        let c = Coordinate::new(48.85, 2.35);
        assert_eq!(FixedLocation(Some(c)).request_location().await, Some(c));
        assert_eq!(FixedLocation(None).request_location().await, None);
    }
}
