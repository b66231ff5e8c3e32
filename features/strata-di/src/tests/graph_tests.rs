//! Tests for static validation of the dependency graph

use pretty_assertions::assert_eq;

use crate::{
    Binding, Dependency, DependencyGraphError, Injector, Multiplicity, ResolveError, Scope, Token,
};

#[test]
fn test_valid_graph() {
    let host: Token<String> = Token::single("host");
    let url: Token<String> = Token::single("url");

    let root = Injector::root_with([
        Binding::value(&host, "localhost".to_string()),
        Binding::factory(&url, [Dependency::on(&host)], move |deps| {
            Ok(format!("http://{}", deps.get(&host)?))
        }),
    ])
    .unwrap();

    assert!(root.validate().is_ok());
}

#[test]
fn test_reports_every_missing_dependency() {
    let host: Token<String> = Token::single("host");
    let port: Token<u16> = Token::single("port");
    let debug: Token<bool> = Token::single("debug");
    let url: Token<String> = Token::single("url");

    let root = Injector::root_with([Binding::factory(
        &url,
        [
            Dependency::on(&host),
            Dependency::on(&port),
            Dependency::optional(&debug),
        ],
        |_| Ok(String::new()),
    )])
    .unwrap();

    let errors = root.validate().unwrap_err().errors;
    let missing: Vec<&str> = errors
        .iter()
        .map(|error| match error {
            DependencyGraphError::MissingDependency { dependency, required_by } => {
                assert_eq!(*required_by, url.info());
                dependency.name
            }
            other => panic!("unexpected error {other}"),
        })
        .collect();

    assert_eq!(missing, vec!["host", "port"]);
}

#[test]
fn test_reports_cycle_with_chain() {
    let x: Token<u8> = Token::single("x");
    let y: Token<u8> = Token::single("y");

    let root = Injector::root_with([
        Binding::factory(&x, [Dependency::on(&y)], |_| Ok(0u8)),
        Binding::factory(&y, [Dependency::on(&x)], |_| Ok(0u8)),
    ])
    .unwrap();

    let errors = root.validate().unwrap_err();
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(
        errors.to_string(),
        "The dependency graph had one or more errors:\n\
         - A Circular Dependency exists between 'y' and 'x' through x -> y -> x - Consider using `Dependency::deferred`"
    );
}

#[test]
fn test_deferred_edges_are_not_cycles() {
    let x: Token<u8> = Token::single("x");
    let y: Token<u8> = Token::single("y");

    let root = Injector::root_with([
        Binding::factory(&x, [Dependency::on(&y)], |_| Ok(0u8)),
        Binding::factory(&y, [Dependency::deferred(&x)], |_| Ok(0u8)),
    ])
    .unwrap();

    assert!(root.validate().is_ok());
}

#[test]
fn test_deferred_target_must_exist() {
    let x: Token<u8> = Token::single("x");
    let y: Token<u8> = Token::single("y");

    let root =
        Injector::root_with([Binding::factory(&y, [Dependency::deferred(&x)], |_| Ok(0u8))])
            .unwrap();

    assert!(matches!(
        root.validate().unwrap_err().errors.as_slice(),
        [DependencyGraphError::MissingDependency { .. }]
    ));
}

#[test]
fn test_local_dependencies_checked_at_owner() {
    let label: Token<String> = Token::single("label");
    let title: Token<String> = Token::define("title", Multiplicity::Single, Scope::Local);
    let bind_title = || {
        Binding::factory(&title, [Dependency::on(&label)], move |deps| {
            Ok(deps.get(&label)?.to_string())
        })
    };

    let root = Injector::root_with([bind_title()]).unwrap();
    let child = root
        .create_child([Binding::value(&label, "child".to_string())])
        .unwrap();

    // The root owns title and has no label, whatever the child binds
    assert!(root.validate().is_err());
    assert!(child.validate().is_err());
    assert!(child.get(&title).is_err());

    // Bound again below the child, its dependency is found at the child
    let view = child.create_child([bind_title()]).unwrap();
    assert!(view.validate().is_ok());
    assert_eq!(*view.get(&title).unwrap(), "child");
}

#[test]
fn test_child_cannot_supply_module_dependency() {
    let label: Token<String> = Token::single("label");
    let title: Token<String> = Token::single("title");

    let root = Injector::root_with([Binding::factory(&title, [Dependency::on(&label)], move |deps| {
        Ok(deps.get(&label)?.to_string())
    })])
    .unwrap();
    let child = root
        .create_child([Binding::value(&label, "child".to_string())])
        .unwrap();

    // Resolution agrees: the root owns title and has no label
    assert!(child.get(&title).is_err());
    assert!(child.validate().is_err());
}

#[test]
fn test_empty_multi_dependency_is_missing() {
    let handlers: Token<u8> = Token::multi("handlers");
    let count: Token<usize> = Token::single("count");

    let root = Injector::root_with([Binding::factory(
        &count,
        [Dependency::on(&handlers)],
        move |deps| Ok(deps.all(&handlers)?.len()),
    )])
    .unwrap();
    assert!(root.validate().is_err());

    root.register(Binding::value(&handlers, 1u8)).unwrap();
    assert!(root.validate().is_ok());
    assert_eq!(*root.get(&count).unwrap(), 1);
}

#[test]
fn test_destroyed_injector_cannot_be_validated() {
    let root = Injector::root();
    let child = root.create_child([]).unwrap();
    child.destroy();

    assert!(matches!(
        child.validate().unwrap_err().errors.as_slice(),
        [DependencyGraphError::Destroyed(id)] if *id == child.id()
    ));
}

#[test]
fn test_deferred_multi_dependency_is_reported() {
    let handlers: Token<u8> = Token::multi("handlers");
    let count: Token<usize> = Token::single("count");

    let root = Injector::root_with([
        Binding::value(&handlers, 1u8),
        Binding::factory(&count, [Dependency::deferred(&handlers)], |_| Ok(0usize)),
    ])
    .unwrap();

    assert!(matches!(
        root.validate().unwrap_err().errors.as_slice(),
        [DependencyGraphError::DeferredMulti { dependency, required_by }]
            if *dependency == handlers.info() && *required_by == count.info()
    ));
    assert!(matches!(
        root.get(&count),
        Err(ResolveError::MultiplicityMismatch { token, .. }) if token == handlers.info()
    ));
}
