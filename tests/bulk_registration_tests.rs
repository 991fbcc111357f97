// Tests for registering several cached methods at once

mod common;

use cachette::{CacheError, CacheKey, Cacheable, CachedClass, CachingOptions, InstanceMemo};
use common::spy_registry;

struct Account {
    id: u32,
    balance: i64,
    memo: InstanceMemo,
}

impl Cacheable for Account {
    fn cache_id(&self) -> CacheKey {
        CacheKey::scalar(self.id)
    }

    fn cache_memo(&self) -> &InstanceMemo {
        &self.memo
    }
}

fn balance(account: &Account, _: &()) -> i64 {
    account.balance
}

fn overdraft(account: &Account, _: &()) -> i64 {
    account.balance.min(0)
}

#[test]
fn test_each_name_gets_its_own_entry() {
    let (store, registry) = spy_registry();
    let class = CachedClass::with_registry("Account", registry);
    let entries: [(&str, fn(&Account, &()) -> i64); 2] =
        [("balance", balance), ("overdraft", overdraft)];

    let methods = class
        .caches_methods(entries, CachingOptions::new().no_sha(true))
        .unwrap();
    let account = Account {
        id: 4,
        balance: -20,
        memo: InstanceMemo::new(),
    };

    assert_eq!(methods[0].call(&account, ()).unwrap(), -20);
    assert_eq!(methods[1].call(&account, ()).unwrap(), -20);

    let keys = store.keys.lock().clone();
    assert_eq!(
        keys,
        vec![
            "Account:balance:version:1:4".to_string(),
            "Account:overdraft:version:1:4".to_string()
        ]
    );
    assert_eq!(account.memo.len(), 2);
}

#[test]
fn test_shared_options_apply_to_every_method() {
    let (_store, registry) = spy_registry();
    let class = CachedClass::with_registry("Account", registry);
    let entries: [(&str, fn(&Account, &()) -> i64); 2] =
        [("balance", balance), ("overdraft", overdraft)];
    let methods = class
        .caches_methods(entries, CachingOptions::new().never_expires())
        .unwrap();

    for method in &methods {
        assert_eq!(method.options().expires_in, Some(cachette::Expiration::Never));
    }
}

#[test]
fn test_first_invalid_name_fails_the_call() {
    let (_store, registry) = spy_registry();
    let class = CachedClass::with_registry("Account", registry);
    let entries: [(String, fn(&Account, &()) -> i64); 3] = [
        ("balance".to_string(), balance),
        (String::new(), overdraft),
        ("also:bad".to_string(), overdraft),
    ];

    match class.caches_methods(entries, CachingOptions::new()) {
        Err(CacheError::InvalidMethodName(name)) => assert_eq!(name, ""),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected an invalid name error"),
    }
}

#[test]
fn test_empty_registration() {
    let (_store, registry) = spy_registry();
    let class = CachedClass::with_registry("Account", registry);
    let entries: Vec<(&str, fn(&()) -> u8)> = Vec::new();
    assert!(class
        .caches_class_methods(entries, CachingOptions::new())
        .unwrap()
        .is_empty());
}
