use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use strata_config::config::Config;
use strata_di::{
    Binding, Construct, Dependencies, Dependency, DynError, Injector, Multiplicity, RegisterError,
    Scope, Token,
};

use crate::{
    config::BoardConfig,
    modules::tasks::{
        task::Task,
        task_service::{TaskService, TASK_SERVICE},
    },
    tokens::BOARD_CONFIG,
};

/// Paging state, bound in every view injector
pub static VIEW_STATE: Lazy<Token<ViewState>> =
    Lazy::new(|| Token::define("view_state", Multiplicity::Single, Scope::Local));

pub static VIEW_FILTER: Lazy<Token<ViewFilter>> = Lazy::new(|| Token::single("view_filter"));

pub static BOARD_VIEW: Lazy<Token<BoardView>> =
    Lazy::new(|| Token::define("board_view", Multiplicity::Single, Scope::Local));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFilter {
    #[default]
    All,
    Open,
    Done,
}

impl ViewFilter {
    fn accepts(&self, task: &Task) -> bool {
        match self {
            ViewFilter::All => true,
            ViewFilter::Open => !task.done,
            ViewFilter::Done => task.done,
        }
    }
}

#[derive(Default)]
pub struct ViewState {
    page: Mutex<usize>,
}

/// A paged listing of the board
pub struct BoardView {
    tasks: Arc<TaskService>,
    state: Arc<ViewState>,
    filter: ViewFilter,
    config: Arc<Config<BoardConfig>>,
}

impl BoardView {
    pub fn render(&self) -> String {
        let page = *self.state.page.lock();
        let visible: Vec<Task> = self
            .tasks
            .tasks()
            .into_iter()
            .filter(|task| self.filter.accepts(task))
            .collect();

        let mut lines = vec![format!(
            "{} - {:?} (page {}, {} tasks)",
            self.config.title,
            self.filter,
            page + 1,
            visible.len()
        )];
        lines.extend(
            visible
                .iter()
                .skip(page * self.config.page_size)
                .take(self.config.page_size)
                .map(|task| format!("  {task}")),
        );
        lines.join("\n")
    }

    pub fn next_page(&self) {
        *self.state.page.lock() += 1;
    }
}

impl Construct for BoardView {
    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::on(&TASK_SERVICE),
            Dependency::on(&VIEW_STATE),
            Dependency::optional(&VIEW_FILTER),
            Dependency::on(&BOARD_CONFIG),
        ]
    }

    fn construct(deps: &Dependencies) -> Result<Self, DynError> {
        Ok(BoardView {
            tasks: deps.get(&TASK_SERVICE)?,
            state: deps.get(&VIEW_STATE)?,
            filter: deps
                .optional(&VIEW_FILTER)?
                .map(|filter| *filter)
                .unwrap_or_default(),
            config: deps.get(&BOARD_CONFIG)?,
        })
    }
}

/// Bindings of a single view, each view injector caches its own state and view
pub fn view_bindings(filter: ViewFilter) -> [Binding; 3] {
    [
        Binding::value(&VIEW_FILTER, filter),
        Binding::factory(&VIEW_STATE, [], |_| Ok(ViewState::default())),
        Binding::class(&BOARD_VIEW),
    ]
}

/// Opens a view scope below `parent`
pub fn open_view(parent: &Injector, filter: ViewFilter) -> Result<Injector, RegisterError> {
    parent.create_child(view_bindings(filter))
}
