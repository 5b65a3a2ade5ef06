//! Integration flows across subsystems.

pub mod finalize_flows;
pub mod order_flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};
    use session_runtime::{InMemoryPlatform, PlatformPorts, SessionConfig, SessionContext};
    use shared_types::{ComponentDescriptor, InMemoryTrialStore, Roster, TrialRecord};
    use ss_02_encryption_queue::SealedBoxProvider;
    use std::sync::Arc;

    /// Four-component study, uuids `u1..u4`, ids `101..104`.
    pub fn roster() -> Roster {
        Roster::new(
            (1..=4)
                .map(|n| ComponentDescriptor::new(100 + n as i64, format!("u{n}"), n))
                .collect(),
        )
    }

    /// Orders `A` (natural) and `B` (reversed middle).
    pub fn study_config() -> Value {
        json!({
            "otputil_order": {
                "order": {
                    "A": ["intro", "left", "right", "outro"],
                    "B": ["intro", "right", "left", "outro"]
                },
                "uuid": {"intro": "u1", "left": "u2", "right": "u3", "outro": "u4"}
            }
        })
    }

    pub fn record(value: Value) -> TrialRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    pub async fn session(
        platform: InMemoryPlatform,
        config: SessionConfig,
    ) -> (Arc<SessionContext>, Arc<InMemoryPlatform>) {
        let platform = Arc::new(platform);
        let context = SessionContext::prepare(
            config,
            PlatformPorts::from_platform(Arc::clone(&platform)),
            Arc::new(InMemoryTrialStore::new()),
            Arc::new(SealedBoxProvider),
        )
        .await
        .expect("session prepares");
        (Arc::new(context), platform)
    }
}
