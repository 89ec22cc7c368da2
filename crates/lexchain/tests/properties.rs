//! Property tests over the full registry.

use proptest::prelude::*;

use lexchain::{PermsError, RegistryConfig};
use lexchain_testkit::{GrantParams, TestFixture};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grant_in_force_until_expiry(params: GrantParams) {
        let active = runtime().block_on(async {
            let fx = TestFixture::new();
            fx.registry
                .upload_document(&fx.alice, &params.hash, "")
                .await
                .unwrap();
            fx.registry
                .grant_access(&fx.alice, &params.hash, &params.grantee, params.duration)
                .await
                .unwrap();
            fx.advance(params.elapsed);
            fx.registry.has_access(&params.hash, &params.grantee).await.unwrap()
        });

        prop_assert_eq!(active, params.expect_active());
    }

    #[test]
    fn stranger_reupload_always_not_owner(metadata in "[ -~]{0,64}") {
        let (not_owner, before, after) = runtime().block_on(async {
            let fx = TestFixture::with_config(RegistryConfig {
                max_metadata_len: 16,
                ..RegistryConfig::default()
            });
            let doc = fx.alice_uploads("abc").await;
            let before = fx.registry.head_seq().await.unwrap();
            let err = fx
                .registry
                .upload_document(&fx.mallory, &doc, &metadata)
                .await
                .unwrap_err();
            let not_owner = matches!(err.as_permission(), Some(PermsError::NotOwner { .. }));
            (not_owner, before, fx.registry.head_seq().await.unwrap())
        });

        prop_assert!(not_owner);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn rejected_grants_leave_log_untouched(duration in i64::MIN..=0) {
        let (before, after) = runtime().block_on(async {
            let fx = TestFixture::new();
            let doc = fx.alice_uploads("abc").await;
            let before = fx.registry.head_seq().await.unwrap();
            let _ = fx
                .registry
                .grant_access(&fx.alice, &doc, &fx.bob, duration)
                .await;
            (before, fx.registry.head_seq().await.unwrap())
        });

        prop_assert_eq!(before, after);
    }
}
