//! Tests for where instances are cached

use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::Calls;
use crate::{Binding, Dependency, Injector, Multiplicity, Scope, Token};

#[test]
fn test_root_scoped_instance_shared_by_children() {
    let store: Token<Vec<String>> = Token::define("store", Multiplicity::Single, Scope::Root);
    let root =
        Injector::root_with([Binding::factory(&store, [], |_| Ok(Vec::<String>::new()))]).unwrap();

    let left = root.create_child([]).unwrap();
    let right = root.create_child([]).unwrap();

    assert!(Arc::ptr_eq(&left.get(&store).unwrap(), &right.get(&store).unwrap()));
    assert_eq!(root.cached_len(), 1);
    assert_eq!(left.cached_len(), 0);
}

#[test]
fn test_local_scope_is_cached_at_its_owner() {
    let state: Token<Vec<u32>> = Token::define("view_state", Multiplicity::Single, Scope::Local);
    let calls = Calls::default();
    let counter = calls.clone();

    let root = Injector::root_with([Binding::factory(&state, [], move |_| {
        counter.hit();
        Ok(Vec::<u32>::new())
    })])
    .unwrap();
    let left = root.create_child([]).unwrap();
    let right = root.create_child([]).unwrap();

    let from_root = root.get(&state).unwrap();

    assert!(Arc::ptr_eq(&from_root, &left.get(&state).unwrap()));
    assert!(Arc::ptr_eq(&from_root, &right.get(&state).unwrap()));
    assert_eq!(calls.count(), 1);
    assert_eq!(root.cached_len(), 1);
    assert_eq!(left.cached_len(), 0);
}

#[test]
fn test_local_bindings_at_siblings_are_distinct() {
    let state: Token<Vec<u32>> = Token::single("view_state");
    let calls = Calls::default();
    let factory = || {
        let counter = calls.clone();
        Binding::factory(&state, [], move |_| {
            counter.hit();
            Ok(Vec::<u32>::new())
        })
        .in_scope(Scope::Local)
    };

    let root = Injector::root();
    let left = root.create_child([factory()]).unwrap();
    let right = root.create_child([factory()]).unwrap();
    let from_left = left.get(&state).unwrap();

    assert!(!Arc::ptr_eq(&from_left, &right.get(&state).unwrap()));
    assert!(Arc::ptr_eq(&from_left, &left.get(&state).unwrap()));
    assert_eq!(calls.count(), 2);
    assert_eq!(left.cached_len(), 1);
    assert_eq!(root.cached_len(), 0);
}

#[test]
fn test_local_dependencies_resolve_from_owner() {
    let label: Token<String> = Token::single("label");
    let title: Token<String> = Token::define("title", Multiplicity::Single, Scope::Local);

    let root = Injector::root_with([
        Binding::value(&label, "root".to_string()),
        Binding::factory(&title, [Dependency::on(&label)], move |deps| {
            Ok(format!("[{}]", deps.get(&label)?))
        }),
    ])
    .unwrap();
    let child = root
        .create_child([Binding::value(&label, "child".to_string())])
        .unwrap();

    assert_eq!(*child.get(&title).unwrap(), "[root]");
    assert!(Arc::ptr_eq(&child.get(&title).unwrap(), &root.get(&title).unwrap()));

    // Bound again in the child it sees the child's label
    let view = child
        .create_child([Binding::factory(&title, [Dependency::on(&label)], move |deps| {
            Ok(format!("[{}]", deps.get(&label)?))
        })])
        .unwrap();
    assert_eq!(*view.get(&title).unwrap(), "[child]");
}

#[test]
fn test_module_dependencies_resolve_from_owner() {
    let label: Token<String> = Token::single("label");
    let title: Token<String> = Token::single("title");

    let root = Injector::root_with([
        Binding::value(&label, "root".to_string()),
        Binding::factory(&title, [Dependency::on(&label)], move |deps| {
            Ok(format!("[{}]", deps.get(&label)?))
        }),
    ])
    .unwrap();
    let child = root
        .create_child([Binding::value(&label, "child".to_string())])
        .unwrap();

    assert_eq!(*child.get(&title).unwrap(), "[root]");
    assert!(Arc::ptr_eq(&child.get(&title).unwrap(), &root.get(&title).unwrap()));
}

#[test]
fn test_override_between_requester_and_cached_owner() {
    let token: Token<String> = Token::single("endpoint");

    let root =
        Injector::root_with([Binding::factory(&token, [], |_| Ok("root".to_string()))]).unwrap();
    let middle = root.create_child([]).unwrap();
    let leaf = middle.create_child([]).unwrap();

    assert_eq!(*leaf.get(&token).unwrap(), "root");

    middle
        .register(Binding::factory(&token, [], |_| Ok("middle".to_string())))
        .unwrap();

    assert_eq!(*leaf.get(&token).unwrap(), "middle");
    assert_eq!(*root.get(&token).unwrap(), "root");
}

#[test_log::test]
fn test_root_scope_below_root_is_cached_at_owner() {
    let token: Token<Vec<u8>> = Token::define("pool", Multiplicity::Single, Scope::Root);

    let root = Injector::root();
    let child = root
        .create_child([Binding::factory(&token, [], |_| Ok(Vec::<u8>::new()))])
        .unwrap();
    let grandchild = child.create_child([]).unwrap();

    assert!(Arc::ptr_eq(&child.get(&token).unwrap(), &grandchild.get(&token).unwrap()));
    assert_eq!(child.cached_len(), 1);
    assert_eq!(root.cached_len(), 0);
}
