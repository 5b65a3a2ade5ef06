//! # Order Flows
//!
//! Study config with custom orders → bootstrap → finalize → platform jump.
//!
//! Each component of a study runs in its own session; these tests replay the
//! study one component at a time and check where each hands off to.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{roster, session, study_config};
    use serde_json::json;
    use session_runtime::{InMemoryPlatform, LifecycleCall, RuntimeError, SessionConfig};
    use shared_types::{ComponentDescriptor, ComponentId, ExecutionMode, Roster};
    use ss_01_component_order::{ConfigError, ResolvedNext};
    use ss_03_session_finalizer::{
        ContinueAction, FinalizeOptions, FinalizeOutcome, FinalizerError,
    };

    fn platform_at(position: u32) -> InMemoryPlatform {
        InMemoryPlatform::new(roster(), position).with_study_config(study_config())
    }

    async fn hand_off(platform: InMemoryPlatform) -> LifecycleCall {
        let (context, platform) = session(platform, SessionConfig::default()).await;
        let finalizer = context.finalizer(FinalizeOptions::default()).unwrap();
        finalizer.finalize().await.unwrap();

        let transitions = platform.transitions();
        assert_eq!(transitions.len(), 1);
        transitions[0].clone()
    }

    fn jump(id: i64) -> LifecycleCall {
        LifecycleCall::JumpToComponent {
            id: ComponentId::Numeric(id),
            message: None,
        }
    }

    #[tokio::test]
    async fn test_order_b_walks_reversed_middle() {
        // B: intro(u1) → right(u3) → left(u2) → outro(u4)
        let expected = [(1, jump(103)), (3, jump(102)), (2, jump(104))];
        for (position, call) in expected {
            let platform = platform_at(position).with_query("order", "B");
            assert_eq!(hand_off(platform).await, call, "from position {position}");
        }

        let last = platform_at(4).with_query("order", "B");
        assert_eq!(
            hand_off(last).await,
            LifecycleCall::End {
                success: true,
                message: None,
                follow_up: true
            }
        );
    }

    #[tokio::test]
    async fn test_ignore_code_keeps_platform_order() {
        let platform = platform_at(2).with_query("order", "ignore");
        assert_eq!(
            hand_off(platform).await,
            LifecycleCall::Advance { message: None }
        );
    }

    #[tokio::test]
    async fn test_study_without_orders_advances() {
        let platform = InMemoryPlatform::new(roster(), 2).with_study_config(json!({"title": "x"}));
        assert_eq!(
            hand_off(platform).await,
            LifecycleCall::Advance { message: None }
        );
    }

    #[tokio::test]
    async fn test_operator_run_defaults_to_first_order() {
        let platform = platform_at(2).with_mode(ExecutionMode::Operator);
        assert_eq!(hand_off(platform).await, jump(103));
    }

    #[tokio::test]
    async fn test_participant_without_code_cannot_start() {
        let platform = std::sync::Arc::new(platform_at(1));
        let result = session_runtime::SessionContext::prepare(
            SessionConfig::default(),
            session_runtime::PlatformPorts::from_platform(platform),
            std::sync::Arc::new(shared_types::InMemoryTrialStore::new()),
            std::sync::Arc::new(ss_02_encryption_queue::SealedBoxProvider),
        )
        .await;

        assert!(matches!(
            result,
            Err(RuntimeError::Order(ConfigError::NoOrderParameter))
        ));
    }

    #[tokio::test]
    async fn test_roster_mismatch_cannot_start() {
        let mut components = roster().components().to_vec();
        components.push(ComponentDescriptor::new(105, "u5", 5));
        let platform = InMemoryPlatform::new(Roster::new(components), 1)
            .with_study_config(study_config())
            .with_query("order", "A");

        let result = session_runtime::SessionContext::prepare(
            SessionConfig::default(),
            session_runtime::PlatformPorts::from_platform(std::sync::Arc::new(platform)),
            std::sync::Arc::new(shared_types::InMemoryTrialStore::new()),
            std::sync::Arc::new(ss_02_encryption_queue::SealedBoxProvider),
        )
        .await;

        assert!(matches!(
            result,
            Err(RuntimeError::Order(ConfigError::ComponentNotInOrder { .. }))
        ));
    }

    #[tokio::test]
    async fn test_explicit_continue_conflicts_with_order() {
        let (context, platform) =
            session(platform_at(1).with_query("order", "A"), SessionConfig::default()).await;
        assert_eq!(
            context.resolved(),
            &ResolvedNext::Component(ComponentId::Numeric(102))
        );

        let result = context.finalizer(
            FinalizeOptions::default().with_continue(ContinueAction::EndSession),
        );
        assert!(matches!(
            result,
            Err(RuntimeError::Finalizer(FinalizerError::OrderOverride { .. }))
        ));
        assert!(platform.transitions().is_empty());
    }

    #[tokio::test]
    async fn test_skip_conflicts_with_order() {
        let (context, _) =
            session(platform_at(1).with_query("order", "A"), SessionConfig::default()).await;
        let result =
            context.finalizer(FinalizeOptions::default().with_continue(ContinueAction::Skip));
        assert!(matches!(
            result,
            Err(RuntimeError::Finalizer(FinalizerError::OrderOverride { .. }))
        ));
    }

    #[tokio::test]
    async fn test_last_in_order_ends_session() {
        let (context, _) =
            session(platform_at(4).with_query("order", "B"), SessionConfig::default()).await;
        let finalizer = context.finalizer(FinalizeOptions::default()).unwrap();
        assert_eq!(finalizer.options().continue_with, ContinueAction::EndSession);
        assert!(matches!(
            finalizer.finalize().await,
            Ok(FinalizeOutcome::Transitioned(ContinueAction::EndSession))
        ));
    }
}
