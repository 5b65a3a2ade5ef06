//! # Session Runtime Demo
//!
//! Runs one scripted component session against the in-memory platform:
//! bootstrap, a few trials (one encrypted), then finalize.
//!
//! `SS_SCENARIO` picks the script:
//!
//! - `default` - middle component, advance to the next one
//! - `custom-order` - custom order `B` jumps from the first to the third component
//! - `end` - last component, ends the session with accumulated messages

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use session_runtime::{
    EncryptPolicy, InMemoryPlatform, PlatformPorts, SessionConfig, SessionContext, TrialOptions,
};
use shared_types::{ComponentDescriptor, InMemoryTrialStore, Roster, SessionStore};
use ss_02_encryption_queue::{CryptoProvider, KeyPairOptions, SealedBoxProvider};
use ss_03_session_finalizer::{ContinueAction, FinalizeOptions};

fn roster() -> Roster {
    Roster::new(vec![
        ComponentDescriptor::new(11, "c0ffee01", 1),
        ComponentDescriptor::new(12, "c0ffee02", 2),
        ComponentDescriptor::new(13, "c0ffee03", 3),
    ])
}

/// Platform and finalize options for `scenario`.
fn script(scenario: &str) -> Result<(InMemoryPlatform, FinalizeOptions)> {
    let platform = match scenario {
        "default" => InMemoryPlatform::new(roster(), 2),
        "custom-order" => InMemoryPlatform::new(roster(), 1)
            .with_study_config(json!({"otputil_order": {
                "order": {"A": ["intro", "task", "outro"], "B": ["intro", "outro", "task"]},
                "uuid": {"intro": "c0ffee01", "task": "c0ffee02", "outro": "c0ffee03"}
            }}))
            .with_query("order", "B"),
        "end" => InMemoryPlatform::new(roster(), 3),
        other => anyhow::bail!("unknown scenario '{other}'"),
    };
    let platform = platform.with_result_ids("1042", "5123");

    let options = match scenario {
        "end" => {
            platform.set_var("otpSessionMessages", json!(["consent=yes"]));
            FinalizeOptions::default()
                .with_continue(ContinueAction::EndSession)
                .with_message("completed")
        }
        _ => FinalizeOptions::default(),
    };
    Ok((platform, options))
}

fn trial(index: u64, extra: Value) -> serde_json::Map<String, Value> {
    let mut record = serde_json::Map::new();
    record.insert("trial_index".into(), json!(index));
    record.insert("trial_type".into(), json!("html-keyboard-response"));
    record.insert("time_elapsed".into(), json!(1500 * (index + 1)));
    if let Value::Object(extra) = extra {
        record.extend(extra);
    }
    record
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = SessionConfig::from_env().context("loading session config")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let provider = Arc::new(SealedBoxProvider);
    let config = match config.public_key_armored {
        Some(_) => config,
        None => {
            warn!("No public key configured, generating a throwaway pair");
            let keys = provider
                .generate_key_pair("demo", &KeyPairOptions::default())
                .context("generating key pair")?;
            config.with_public_key(keys.public_key_armored)
        }
    };

    let (platform, options) = script(&config.scenario)?;
    let platform = Arc::new(platform);
    let context = Arc::new(
        SessionContext::prepare(
            config,
            PlatformPorts::from_platform(Arc::clone(&platform)),
            Arc::new(InMemoryTrialStore::new()),
            provider,
        )
        .await
        .context("preparing session")?,
    );

    let plain = context.trial_finisher(TrialOptions::default().send_partial());
    let sensitive = context.trial_finisher(
        TrialOptions::default()
            .encrypt_if(EncryptPolicy::Field("age".into()))
            .send_partial(),
    );
    plain.finish(trial(0, json!({"rt": 812}))).await?;
    sensitive.finish(trial(1, json!({"age": 34}))).await?;
    plain.finish(trial(2, json!({"rt": 640}))).await?;

    let finalizer = context.finalizer(options)?;
    finalizer.add_message(format!("trials={}", context.trials().all_records().len()), false);
    let outcome = finalizer.finalize().await.context("finalizing session")?;

    info!(outcome = ?outcome, "Finalize complete");
    info!(partial_sends = platform.appended().len(), full_sends = platform.submitted().len(), "Transmissions");
    for call in platform.transitions() {
        info!(call = ?call, "Platform transition");
    }
    Ok(())
}
