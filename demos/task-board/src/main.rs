use std::sync::Arc;

use modules::{
    board::board_view::{self, ViewFilter, BOARD_VIEW},
    http::{
        http_client::{Request, HTTP_CLIENT},
        interceptors::{self, AuditInterceptor, Interceptor, INTERCEPTORS},
    },
    notifications::notification_service::NOTIFICATIONS,
    tasks::{
        task_service::{LEGACY_TASK_API, TASK_SERVICE},
        task_store::TASK_STORE,
    },
};
use strata_config::{config::Config, provider::ConfigProvider};
use strata_di::{Binding, Injector};

use crate::{
    errors::AppError,
    tokens::{BOARD_CONFIG, CONFIG_PROVIDER, HTTP_CONFIG},
};

mod config;
mod errors;
mod modules;
mod tokens;

fn main() {
    init_logging();

    match run() {
        Ok(()) => tracing::info!("Task board ended without error"),
        Err(e) => {
            tracing::error!("Task board ended with error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// The application wide injector
fn build_root(config_provider: ConfigProvider) -> Result<Injector, AppError> {
    let root = Injector::builder()
        .add_value(&CONFIG_PROVIDER, config_provider)
        .add(Config::binding(&BOARD_CONFIG, &CONFIG_PROVIDER))
        .add(Config::binding(&HTTP_CONFIG, &CONFIG_PROVIDER))
        .add_class(&TASK_STORE)
        .add_class(&HTTP_CLIENT)
        .add_class(&NOTIFICATIONS)
        .add_class(&TASK_SERVICE)
        .add_alias(&LEGACY_TASK_API, &TASK_SERVICE)
        .build()?;

    for binding in interceptors::default_interceptors() {
        root.register(binding)?;
    }

    Ok(root)
}

/// Injector for admin tooling, its requests carry an extra audit interceptor
fn open_admin_scope(root: &Injector) -> Result<Injector, AppError> {
    let admin = root.create_child([
        Binding::value(
            &INTERCEPTORS,
            Arc::new(AuditInterceptor { actor: "admin" }) as Arc<dyn Interceptor>,
        ),
        Binding::class(&HTTP_CLIENT),
    ])?;
    Ok(admin)
}

fn run() -> Result<(), AppError> {
    let root = build_root(config::load_config()?)?;
    root.validate()?;
    tracing::debug!("{:?}", root);

    let tasks = root.get(&TASK_SERVICE)?;
    let release_notes = tasks.create("Write the release notes")?;
    tasks.create("Review the scheduler patch")?;
    tasks.create("Rotate the api keys")?;
    tasks.complete(release_notes.id)?;

    // Older components share the very same service
    let legacy = root.get(&LEGACY_TASK_API)?;
    legacy.create("Migrate the legacy importer")?;
    tracing::info!(
        "Legacy api shares the task service: {}",
        Arc::ptr_eq(&legacy, &tasks)
    );

    let open_view = board_view::open_view(&root, ViewFilter::Open)?;
    let done_view = board_view::open_view(&root, ViewFilter::Done)?;

    let open = open_view.get(&BOARD_VIEW)?;
    println!("{}", open.render());
    open.next_page();
    println!("{}", open.render());
    println!("{}", done_view.get(&BOARD_VIEW)?.render());

    let admin = open_admin_scope(&root)?;
    let admin_client = admin.get(&HTTP_CLIENT)?;
    tracing::info!("Admin interceptors: {:?}", admin_client.interceptor_names());
    let response = admin_client.send(Request::new("DELETE", "/tasks/done"));
    tracing::info!("Admin cleanup answered {} for {}", response.status, response.url);

    for message in root.get(&NOTIFICATIONS)?.messages() {
        println!("* {message}");
    }

    open_view.destroy();
    done_view.destroy();
    admin.destroy();
    tracing::debug!("{:?}", root);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_root() -> Injector {
        let mut provider = ConfigProvider::new();
        provider
            .add_config(config::BoardConfig {
                title: "Test".to_string(),
                capacity: 8,
                page_size: 2,
            })
            .unwrap()
            .add_config(config::HttpConfig {
                base_url: "http://test".to_string(),
                api_key: Some("secret".to_string()),
            })
            .unwrap();
        build_root(provider).unwrap()
    }

    #[test]
    fn test_wiring_is_valid() {
        let root = test_root();
        assert!(root.validate().is_ok());

        let view = board_view::open_view(&root, ViewFilter::All).unwrap();
        assert!(view.validate().is_ok());
    }

    #[test]
    fn test_notifications_see_task_service() {
        let root = test_root();
        let tasks = root.get(&TASK_SERVICE).unwrap();

        let task = tasks.create("first").unwrap();
        tasks.complete(task.id).unwrap();

        assert_eq!(
            root.get(&NOTIFICATIONS).unwrap().messages(),
            vec![
                "created [ ] #1 first (1 open)".to_string(),
                "completed [x] #1 first (0 open)".to_string(),
            ]
        );
        assert!(Arc::ptr_eq(&root.get(&LEGACY_TASK_API).unwrap(), &tasks));
    }

    #[test]
    fn test_views_are_not_bound_at_the_root() {
        let root = test_root();
        assert!(root.get(&BOARD_VIEW).is_err());

        let view = board_view::open_view(&root, ViewFilter::All).unwrap();
        assert!(Arc::ptr_eq(
            &view.get(&BOARD_VIEW).unwrap(),
            &view.get(&BOARD_VIEW).unwrap()
        ));
        // The view and its paging state live at the view injector
        assert_eq!(view.cached_len(), 2);
    }

    #[test]
    fn test_views_keep_their_own_page() {
        let root = test_root();
        let tasks = root.get(&TASK_SERVICE).unwrap();
        for title in ["a", "b", "c"] {
            tasks.create(title).unwrap();
        }

        let left = board_view::open_view(&root, ViewFilter::All).unwrap();
        let right = board_view::open_view(&root, ViewFilter::Open).unwrap();
        let left_view = left.get(&BOARD_VIEW).unwrap();
        left_view.next_page();

        assert!(left_view.render().contains("page 2"));
        assert!(right.get(&BOARD_VIEW).unwrap().render().contains("page 1"));
    }

    #[test]
    fn test_admin_scope_adds_interceptor() {
        let root = test_root();
        let admin = open_admin_scope(&root).unwrap();

        assert_eq!(
            root.get(&HTTP_CLIENT).unwrap().interceptor_names(),
            vec!["auth", "tracing"]
        );
        assert_eq!(
            admin.get(&HTTP_CLIENT).unwrap().interceptor_names(),
            vec!["auth", "tracing", "audit"]
        );
    }
}
