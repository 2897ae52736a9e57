//! Saving, loading and hydrating the persistent cache.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::harness::{
    blockchain_data_locked, blockchain_data_unlocked, configured_mailbox, mailbox_with,
    paywall_config, FaultyStore, LOCKS,
};
use paywall_mailbox::{
    CacheLoad, Error, ExecutionMode, Invalidation, KeyValueStore, MailboxEvent, PaywallConfig,
    ShapeViolation,
};
use serde_json::json;

#[test]
fn test_round_trip() {
    let mut test = configured_mailbox();
    test.mailbox
        .receive_blockchain_data(blockchain_data_unlocked())
        .unwrap();

    let loaded = test.mailbox.get_blockchain_data_from_local_storage_cache();

    assert_eq!(&loaded, test.mailbox.blockchain_data());
    assert_eq!(
        serde_json::to_value(&loaded).unwrap(),
        blockchain_data_unlocked()
    );
}

#[test]
fn test_reload_hydrates_from_shared_store() {
    let mut first = configured_mailbox();
    first
        .mailbox
        .receive_blockchain_data(blockchain_data_unlocked())
        .unwrap();

    // A new frame on the same origin sees the same store
    let mut second = mailbox_with(first.store.clone(), ExecutionMode::Production);
    second.mailbox.set_configuration(paywall_config()).unwrap();
    let mut events = second.mailbox.subscribe_events();

    assert!(second.mailbox.hydrate_from_cache());
    assert_eq!(second.mailbox.blockchain_data(), first.mailbox.blockchain_data());
    assert_eq!(events.try_recv().unwrap(), MailboxEvent::CacheHydrated);
}

#[test]
fn test_reordered_configuration_shares_cache() {
    let mut first = configured_mailbox();
    first
        .mailbox
        .receive_blockchain_data(blockchain_data_locked())
        .unwrap();

    let mut second = mailbox_with(first.store.clone(), ExecutionMode::Production);
    second
        .mailbox
        .set_configuration(PaywallConfig::from_lock_addresses([LOCKS[2], LOCKS[1]]))
        .unwrap();

    assert_eq!(first.mailbox.get_cache_key(), second.mailbox.get_cache_key());
    assert!(second.mailbox.hydrate_from_cache());
}

#[test]
fn test_different_paywall_does_not_see_cache() {
    let mut first = configured_mailbox();
    first
        .mailbox
        .receive_blockchain_data(blockchain_data_locked())
        .unwrap();

    let mut other = mailbox_with(first.store.clone(), ExecutionMode::Production);
    other
        .mailbox
        .set_configuration(PaywallConfig::from_lock_addresses([LOCKS[0]]))
        .unwrap();

    assert_eq!(other.mailbox.load_cache(), CacheLoad::Miss);
    assert!(!other.mailbox.hydrate_from_cache());
}

#[test]
fn test_tampered_cache_is_rejected_and_removed() {
    let mut test = configured_mailbox();
    test.mailbox
        .receive_blockchain_data(blockchain_data_locked())
        .unwrap();
    let key = test.mailbox.get_cache_key().unwrap();

    let mut tampered = blockchain_data_locked();
    tampered["locks"][LOCKS[1]]["key"]["status"] = json!("valid");
    tampered["locks"][LOCKS[1]]["key"]["owner"] = json!("attacker");
    test.store
        .raw()
        .set(&key, &tampered.to_string())
        .unwrap();
    let mut events = test.mailbox.subscribe_events();

    assert_eq!(
        test.mailbox.load_cache(),
        CacheLoad::Rejected(ShapeViolation::InvalidAddress { field: "key.owner" })
    );
    assert_eq!(test.store.raw().get(&key).unwrap(), None);
    assert!(matches!(
        events.try_recv().unwrap(),
        MailboxEvent::CacheRejected { .. }
    ));
    assert_eq!(test.mailbox.cache_stats().rejections, 1);
}

#[test]
fn test_garbage_cache_yields_default() {
    let test = configured_mailbox();
    let key = test.mailbox.get_cache_key().unwrap();
    test.store.raw().set(&key, "undefined").unwrap();

    let loaded = test.mailbox.get_blockchain_data_from_local_storage_cache();

    assert_eq!(&loaded, test.mailbox.default_blockchain_data());
    assert_eq!(test.store.raw().get(&key).unwrap(), None);
}

#[test]
fn test_hydration_ignores_invalid_cache() {
    let mut test = configured_mailbox();
    let key = test.mailbox.get_cache_key().unwrap();
    test.store
        .raw()
        .set(&key, r#"{"locks": 1, "account": 1}"#)
        .unwrap();

    assert!(!test.mailbox.hydrate_from_cache());
    assert_eq!(
        test.mailbox.blockchain_data(),
        test.mailbox.default_blockchain_data()
    );
}

#[test]
fn test_read_failure_clears_store() {
    let test = configured_mailbox();
    test.store.raw().set("another", "item").unwrap();
    FaultyStore::fail(&test.store.fail_get);

    let mut events = test.mailbox.subscribe_events();

    assert_eq!(
        test.mailbox.load_cache(),
        CacheLoad::Unavailable(Invalidation::Cleared)
    );
    assert!(test.store.raw().is_empty());
    assert_eq!(events.try_recv().unwrap(), MailboxEvent::CacheCleared);
    assert_eq!(
        &test.mailbox.get_blockchain_data_from_local_storage_cache(),
        test.mailbox.default_blockchain_data()
    );
}

#[test]
fn test_failed_clear_after_read_failure_is_reported() {
    let test = configured_mailbox();
    test.store.raw().set("another", "item").unwrap();
    FaultyStore::fail(&test.store.fail_get);
    FaultyStore::fail(&test.store.fail_clear);
    let mut events = test.mailbox.subscribe_events();

    assert_eq!(
        test.mailbox.load_cache(),
        CacheLoad::Unavailable(Invalidation::Failed)
    );
    assert!(events.try_recv().is_err());
    assert_eq!(test.mailbox.cache_stats().clears, 0);
    assert_eq!(test.store.raw().len(), 1);
}

#[test]
fn test_write_failure_is_swallowed() {
    let mut test = configured_mailbox();
    FaultyStore::fail(&test.store.fail_set);

    test.mailbox
        .receive_blockchain_data(blockchain_data_locked())
        .unwrap();

    assert_eq!(test.mailbox.cache_stats().write_failures, 1);
    assert_eq!(test.mailbox.blockchain_data().balance, "234");
    assert_eq!(test.mailbox.load_cache(), CacheLoad::Miss);
}

#[test]
fn test_missing_configuration_never_touches_storage() {
    let mut test = mailbox_with(FaultyStore::new(), ExecutionMode::Development);
    test.store.reset_counters();

    test.mailbox
        .receive_blockchain_data(blockchain_data_locked())
        .unwrap();
    test.mailbox.save_cache_in_local_storage();
    assert_eq!(test.mailbox.load_cache(), CacheLoad::Disabled);
    assert_eq!(
        &test.mailbox.get_blockchain_data_from_local_storage_cache(),
        test.mailbox.default_blockchain_data()
    );
    test.mailbox.invalidate_local_storage_cache();

    assert_eq!(test.store.total_calls(), 0);
}

#[test]
fn test_disabled_cache_never_touches_storage() {
    let mut test = configured_mailbox();
    test.mailbox.set_use_local_storage_cache(false);
    assert!(!test.mailbox.use_local_storage_cache());
    test.store.reset_counters();

    test.mailbox
        .receive_blockchain_data(blockchain_data_locked())
        .unwrap();
    assert_eq!(test.mailbox.load_cache(), CacheLoad::Disabled);
    assert!(!test.mailbox.hydrate_from_cache());

    assert_eq!(test.store.total_calls(), 0);
}

#[test]
fn test_configuration_is_immutable() {
    let mut test = configured_mailbox();
    let key = test.mailbox.get_cache_key();

    let result = test
        .mailbox
        .set_configuration(PaywallConfig::from_lock_addresses([LOCKS[0]]));

    assert!(matches!(result, Err(Error::ConfigurationAlreadySet)));
    assert_eq!(test.mailbox.get_cache_key(), key);
    assert_eq!(test.mailbox.configuration(), Some(&paywall_config()));
}

#[test]
fn test_invalid_configuration_is_not_saved() {
    let mut test = mailbox_with(FaultyStore::new(), ExecutionMode::Production);

    let result = test
        .mailbox
        .set_configuration(PaywallConfig::from_lock_addresses(["hi"]));

    assert!(matches!(result, Err(Error::InvalidPaywallConfig(_))));
    assert_eq!(test.mailbox.configuration(), None);
    assert_eq!(test.mailbox.get_cache_key(), None);
}

#[test]
fn test_default_uses_configured_network() {
    let test = configured_mailbox();
    let default = test.mailbox.default_blockchain_data();

    assert_eq!(default.network, 1984);
    assert_eq!(default.account, None);
    assert_eq!(default.balance, "0");
    assert_eq!(test.mailbox.blockchain_data(), default);
}
