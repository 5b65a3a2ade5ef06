//! # Finalize Flows
//!
//! Trials → encryption queue → finalize → platform.
//!
//! Covers the end-to-end guarantees of a session: encrypted records are
//! replaced before the payload leaves, the terminal transition happens once
//! per session, and session messages surface on the last component.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{record, roster, session};
    use futures::future::join_all;
    use serde_json::{json, Value};
    use async_trait::async_trait;
    use session_runtime::{
        EncryptPolicy, InMemoryPlatform, LifecycleCall, RuntimeError, SessionConfig, TrialOptions,
    };
    use shared_types::SessionStore;
    use ss_02_encryption_queue::{
        CryptoProvider, EncryptionError, EncryptionQueueApi, EncryptionResult, GeneratedKeyPair,
        KeyPairOptions, PrivateKeyMaterial, PublicKeyMaterial, SealedBoxProvider,
        ENCRYPTED_DATA_FIELD,
    };
    use ss_03_session_finalizer::{
        ContinueAction, FinalizeOptions, FinalizeOutcome, FinalizerError, ObservedError, SendMode,
    };
    use std::sync::Arc;

    fn keyed_config() -> (SessionConfig, String) {
        let keys = SealedBoxProvider
            .generate_key_pair("integration", &KeyPairOptions::default())
            .unwrap();
        (
            SessionConfig::default().with_public_key(keys.public_key_armored),
            keys.private_key_armored,
        )
    }

    fn payload(platform: &InMemoryPlatform) -> Vec<Value> {
        let submitted = platform.submitted();
        assert_eq!(submitted.len(), 1, "exactly one full submission");
        serde_json::from_str(&submitted[0]).unwrap()
    }

    #[tokio::test]
    async fn test_encrypted_records_replaced_before_submit() {
        let (config, private_key) = keyed_config();
        let (context, platform) = session(InMemoryPlatform::new(roster(), 2), config).await;

        // submit without awaiting the handles; the finalizer drains
        for index in 0..12u64 {
            let data = record(json!({"trial_index": index, "trial_type": "survey", "answer": index * 3}));
            context.trials().push_record(data.clone());
            context
                .queue()
                .submit(index, Value::Object(data))
                .unwrap();
        }

        let finalizer = context.finalizer(FinalizeOptions::default()).unwrap();
        finalizer.finalize().await.unwrap();

        let sent = payload(&platform);
        assert_eq!(sent.len(), 13);
        for (index, entry) in sent.iter().take(12).enumerate() {
            assert_eq!(entry["trial_index"], json!(index));
            assert_eq!(entry["trial_type"], json!("survey"));
            assert!(entry.get("answer").is_none());
            assert!(entry[ENCRYPTED_DATA_FIELD].is_string());
        }
        assert_eq!(sent[12], json!({"interactionData": []}));

        context.queue().load_private_key(&private_key, None).unwrap();
        let plaintext = context
            .queue()
            .decrypt(sent[5][ENCRYPTED_DATA_FIELD].as_str().unwrap())
            .await
            .unwrap();
        let original: Value = serde_json::from_str(&plaintext).unwrap();
        assert_eq!(original["answer"], json!(15));
    }

    #[tokio::test]
    async fn test_trial_finisher_then_finalize() {
        let (config, _) = keyed_config();
        let (context, platform) = session(InMemoryPlatform::new(roster(), 1), config).await;
        let finisher = context.trial_finisher(
            TrialOptions::default()
                .encrypt_if(EncryptPolicy::Field("private".into()))
                .send_partial(),
        );

        finisher
            .finish(record(json!({"trial_index": 0, "rt": 400})))
            .await
            .unwrap();
        finisher
            .finish(record(json!({"trial_index": 1, "private": true, "email": "a@b.c"})))
            .await
            .unwrap();

        context
            .finalizer(FinalizeOptions::default().without_interaction_events())
            .unwrap()
            .finalize()
            .await
            .unwrap();

        // partial sends stop once the full payload is out
        let late = context.send_partial(json!({"trial_index": 2})).await.unwrap();
        assert!(!late);
        assert_eq!(platform.appended().len(), 2);

        let sent = payload(&platform);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0]["rt"], json!(400));
        assert!(sent[1].get("email").is_none());
        assert_eq!(
            platform.transitions(),
            vec![LifecycleCall::Advance { message: None }]
        );
    }

    #[tokio::test]
    async fn test_concurrent_finalizers_transition_once() {
        let (context, platform) =
            session(InMemoryPlatform::new(roster(), 2), SessionConfig::default()).await;

        let finalizers: Vec<_> = [
            ContinueAction::AdvanceDefault,
            ContinueAction::EndSession,
            ContinueAction::JumpToPosition(4),
        ]
        .into_iter()
        .map(|action| {
            context
                .finalizer(FinalizeOptions::default().with_continue(action))
                .unwrap()
        })
        .collect();

        let outcomes = join_all(finalizers.iter().map(|f| f.finalize())).await;
        let transitioned = outcomes
            .iter()
            .filter(|o| matches!(o, Ok(FinalizeOutcome::Transitioned(_))))
            .count();

        assert_eq!(transitioned, 1);
        assert_eq!(platform.transitions().len(), 1);
        assert!(context.flags().is_finished());
    }

    #[tokio::test]
    async fn test_session_messages_reach_last_component() {
        let platform = InMemoryPlatform::new(roster(), 1);
        let platform = Arc::new(platform);

        // first component persists a message
        {
            let context = session_runtime::SessionContext::prepare(
                SessionConfig::default(),
                session_runtime::PlatformPorts::from_platform(Arc::clone(&platform)),
                Arc::new(shared_types::InMemoryTrialStore::new()),
                Arc::new(SealedBoxProvider),
            )
            .await
            .unwrap();
            let finalizer = context.finalizer(FinalizeOptions::default()).unwrap();
            finalizer.add_message("condition=visual", true);
            finalizer.add_message("first done", false);
            finalizer.finalize().await.unwrap();
        }
        assert_eq!(
            platform.transitions(),
            vec![LifecycleCall::Advance {
                message: Some("condition=visual, first done".into())
            }]
        );

        // last component of the study, same session storage
        let last = InMemoryPlatform::new(roster(), 4);
        let stored = platform.get_var("otpSessionMessages");
        assert_eq!(stored, Some(json!(["condition=visual"])));
        last.set_var("otpSessionMessages", json!(["condition=visual"]));
        let (context, last) = session(last, SessionConfig::default()).await;
        let finalizer = context
            .finalizer(
                FinalizeOptions::default()
                    .with_continue(ContinueAction::EndSession)
                    .with_message("score=9"),
            )
            .unwrap();
        finalizer.add_message("condition=visual", false);
        finalizer.finalize().await.unwrap();

        assert_eq!(
            last.transitions(),
            vec![LifecycleCall::End {
                success: true,
                message: Some("condition=visual, score=9".into()),
                follow_up: true
            }]
        );
    }

    #[tokio::test]
    async fn test_rejected_submit_blocks_then_retry_succeeds() {
        let (context, platform) =
            session(InMemoryPlatform::new(roster(), 2), SessionConfig::default()).await;
        platform.reject_submissions("study result locked");

        let finalizer = context.finalizer(FinalizeOptions::default()).unwrap();
        finalizer.add_message("attempt", false);
        assert!(matches!(
            finalizer.finalize().await,
            Err(FinalizerError::Transport(_))
        ));
        assert!(platform.transitions().is_empty());
        assert!(!context.flags().is_finished());

        // append mode does not hit the rejected path
        let retry = context
            .finalizer(FinalizeOptions::default().with_send_mode(SendMode::Append))
            .unwrap();
        retry.finalize().await.unwrap();
        assert_eq!(platform.appended().len(), 1);
        assert_eq!(
            platform.transitions(),
            vec![LifecycleCall::Advance { message: None }]
        );
    }

    #[tokio::test]
    async fn test_error_log_uploaded_with_transition() {
        let (context, platform) = session(
            InMemoryPlatform::new(roster(), 3).with_result_ids("88", "4501"),
            SessionConfig::default(),
        )
        .await;
        context.observe_error(&ObservedError::new("TypeError", "stimulus is undefined").at("task.js", 12));
        context.observe_error(&ObservedError::new("Error", "Batch channel closed"));

        context
            .finalizer(FinalizeOptions::default())
            .unwrap()
            .finalize()
            .await
            .unwrap();

        let uploads = platform.uploads();
        assert_eq!(uploads.len(), 1);
        let (name, body) = &uploads[0];
        assert_eq!(name, "ERRORS.txt");
        assert!(body.starts_with("componentResultId=4501\n\nstudyResultId=88"));
        assert!(body.contains("stimulus is undefined"));
        assert!(body.contains("(not displayed)"));
    }

    /// Accepts any key, refuses to encrypt.
    struct RefusingProvider;

    #[async_trait]
    impl CryptoProvider for RefusingProvider {
        fn load_public_key(&self, armored: &str) -> EncryptionResult<PublicKeyMaterial> {
            Ok(PublicKeyMaterial::new(armored.as_bytes().to_vec()))
        }

        fn load_private_key(
            &self,
            _armored: &str,
            _passphrase: Option<&str>,
        ) -> EncryptionResult<PrivateKeyMaterial> {
            Err(EncryptionError::PrivateKeyUnavailable)
        }

        async fn encrypt(&self, _plaintext: &str, _key: &PublicKeyMaterial) -> EncryptionResult<String> {
            Err(EncryptionError::Provider("hardware token removed".into()))
        }

        async fn decrypt(&self, _ciphertext: &str, _key: &PrivateKeyMaterial) -> EncryptionResult<String> {
            Err(EncryptionError::PrivateKeyUnavailable)
        }

        fn generate_key_pair(&self, _name: &str, _options: &KeyPairOptions) -> EncryptionResult<GeneratedKeyPair> {
            Err(EncryptionError::Unavailable)
        }
    }

    #[tokio::test]
    async fn test_failed_encryption_blocks_finalize() {
        let platform = Arc::new(InMemoryPlatform::new(roster(), 2));
        let context = Arc::new(
            session_runtime::SessionContext::prepare(
                SessionConfig::default().with_public_key("any"),
                session_runtime::PlatformPorts::from_platform(Arc::clone(&platform)),
                Arc::new(shared_types::InMemoryTrialStore::new()),
                Arc::new(RefusingProvider),
            )
            .await
            .unwrap(),
        );
        let finisher = context.trial_finisher(TrialOptions::default().encrypt_if(EncryptPolicy::Always));

        let own = finisher.finish(record(json!({"trial_index": 0}))).await;
        assert!(matches!(own, Err(RuntimeError::Encryption(EncryptionError::Provider(_)))));

        let finalizer = context.finalizer(FinalizeOptions::default()).unwrap();
        assert!(matches!(
            finalizer.finalize().await,
            Err(FinalizerError::Encryption(EncryptionError::Provider(_)))
        ));
        assert!(platform.submitted().is_empty());
        assert!(platform.transitions().is_empty());
    }
}
