//! Common test utilities
//!
//! Shared fixtures and mock notifiers for integration tests.

use chrono::{DateTime, Duration, Utc};
use postdate::capsule::Capsule;
use postdate::store::{CapsuleStore, MemoryStore};

/// Build a pending capsule with the given recipient and unlock time
pub fn capsule(email: &str, unlock_at: DateTime<Utc>) -> Capsule {
    Capsule::builder()
        .sender_name("Past Me")
        .receiver_email(email)
        .message("hello from the past")
        .unlock_at(unlock_at)
        .build()
        .expect("failed to build capsule")
}

/// Build a capsule that has been due since yesterday
pub fn due_capsule(email: &str) -> Capsule {
    capsule(email, Utc::now() - Duration::days(1))
}

/// Create `count` due capsules in the store, recipients `c0@example.com`..
pub async fn seed_due(store: &MemoryStore, count: usize) -> Vec<Capsule> {
    let mut created = Vec::with_capacity(count);
    for i in 0..count {
        let capsule = capsule(
            &format!("c{i}@example.com"),
            Utc::now() - Duration::hours((count - i) as i64),
        );
        created.push(store.create(capsule).await.expect("failed to seed capsule"));
    }
    created
}

/// Mock notifiers for testing
pub mod mock_notifiers {
    use async_trait::async_trait;
    use postdate::capsule::Capsule;
    use postdate::notify::Notifier;
    use postdate::{Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Notifier that always succeeds
    #[derive(Debug, Default, Clone)]
    pub struct SuccessNotifier;

    #[async_trait]
    impl Notifier for SuccessNotifier {
        async fn send(&self, _capsule: &Capsule) -> Result<()> {
            Ok(())
        }
    }

    /// Notifier that always fails with a transport error
    #[derive(Debug, Clone)]
    pub struct FailingNotifier {
        pub reason: String,
    }

    impl FailingNotifier {
        pub fn new(reason: impl Into<String>) -> Self {
            Self {
                reason: reason.into(),
            }
        }
    }

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _capsule: &Capsule) -> Result<()> {
            Err(Error::Transport(self.reason.clone()))
        }
    }

    /// Notifier that counts invocations, optionally failing every send
    pub struct CountingNotifier {
        pub count: Arc<AtomicUsize>,
        pub fail: bool,
    }

    impl CountingNotifier {
        pub fn new(fail: bool) -> Self {
            Self {
                count: Arc::new(AtomicUsize::new(0)),
                fail,
            }
        }

        pub fn sends(&self) -> usize {
            self.count.load(Ordering::Relaxed)
        }
    }

    impl Clone for CountingNotifier {
        fn clone(&self) -> Self {
            Self {
                count: Arc::clone(&self.count),
                fail: self.fail,
            }
        }
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send(&self, _capsule: &Capsule) -> Result<()> {
            self.count.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                Err(Error::Transport("simulated outage".to_string()))
            } else {
                Ok(())
            }
        }
    }

    /// Notifier that records recipients and bounces selected addresses
    pub struct RecordingNotifier {
        pub delivered: Arc<Mutex<Vec<String>>>,
        pub bounce_marker: Option<String>,
    }

    impl RecordingNotifier {
        /// Fail every recipient whose address contains `marker`
        pub fn bouncing(marker: impl Into<String>) -> Self {
            Self {
                delivered: Arc::new(Mutex::new(Vec::new())),
                bounce_marker: Some(marker.into()),
            }
        }

        pub fn recipients(&self) -> Vec<String> {
            self.delivered.lock().unwrap().clone()
        }
    }

    impl Clone for RecordingNotifier {
        fn clone(&self) -> Self {
            Self {
                delivered: Arc::clone(&self.delivered),
                bounce_marker: self.bounce_marker.clone(),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, capsule: &Capsule) -> Result<()> {
            if let Some(marker) = &self.bounce_marker {
                if capsule.receiver_email.contains(marker.as_str()) {
                    return Err(Error::Transport("mailbox unavailable".to_string()));
                }
            }
            self.delivered
                .lock()
                .unwrap()
                .push(capsule.receiver_email.clone());
            Ok(())
        }
    }
}
