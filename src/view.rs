//! Storefront results controller
//!
//! [`Storefront`] owns one shopper's view of the catalog: the load state, the
//! published catalog snapshot, the current filter selections and the grid/list
//! preference. Filter changes re-run [`FilterState::apply`] over the snapshot
//! without going back to the data service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::filter::FilterState;
use crate::model::Product;
use crate::prefs::{Preferences, VIEW_KEY};
use crate::remote::{DataService, ProductScope};
use crate::render;

/// Quiet period after the last keystroke before a search re-filters.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded,
    LoadError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            _ => None,
        }
    }
}

/// Coalesces search keystrokes: only the last input of a quiet window fires.
#[derive(Debug, Clone)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(Instant, String)>,
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records a keystroke, replacing any input still waiting.
    pub fn input(&mut self, text: &str, now: Instant) {
        self.pending = Some((now + self.delay, text.to_string()));
    }

    /// Returns the pending text once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, text)| text),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

pub struct Storefront<P: Preferences> {
    state: LoadState,
    catalog: Arc<Vec<Product>>,
    filter: FilterState,
    view: ViewMode,
    search: SearchDebounce,
    prefs: P,
}

impl<P: Preferences> Storefront<P> {
    /// Starts in [`LoadState::Loading`] with the view mode restored from `prefs`.
    pub fn new(filter: FilterState, prefs: P) -> Self {
        let view = prefs
            .get(VIEW_KEY)
            .and_then(|raw| ViewMode::parse(&raw))
            .unwrap_or_default();
        Self {
            state: LoadState::Loading,
            catalog: Arc::new(Vec::new()),
            filter,
            view,
            search: SearchDebounce::default(),
            prefs,
        }
    }

    /// Fetches the published catalog once. Failures land in
    /// [`LoadState::LoadError`]; nothing is retried.
    pub async fn load(&mut self, service: &dyn DataService) -> &LoadState {
        self.state = LoadState::Loading;
        match service.list_products(ProductScope::Published).await {
            Ok(rows) => {
                debug!(count = rows.len(), "catalog loaded");
                self.catalog = Arc::new(rows);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!("failed to load products: {e}");
                self.state = LoadState::LoadError(e.to_string());
            }
        }
        &self.state
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn catalog(&self) -> &Arc<Vec<Product>> {
        &self.catalog
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Current results; empty unless loaded.
    pub fn filtered(&self) -> Vec<&Product> {
        match self.state {
            LoadState::Loaded => self.filter.apply(&self.catalog),
            _ => Vec::new(),
        }
    }

    /// Resets the filter selections. The catalog snapshot is untouched.
    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.search = SearchDebounce::default();
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.view = mode;
        self.prefs.set(VIEW_KEY, mode.as_str());
    }

    /// Search box keystroke.
    pub fn type_search(&mut self, text: &str, now: Instant) {
        self.search.input(text, now);
    }

    /// Applies a debounced search whose quiet period has elapsed.
    /// Returns whether the filter changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(query) => {
                self.filter.set_query(&query);
                true
            }
            None => false,
        }
    }

    /// Results panel for the current state.
    pub fn render(&self) -> String {
        let (count, body) = match &self.state {
            LoadState::Loading => (None, render::render_loading()),
            LoadState::LoadError(message) => (None, render::render_error_panel(message)),
            LoadState::Loaded => {
                let results = self.filtered();
                let body = if results.is_empty() {
                    render::render_empty_state()
                } else if self.filter.category == "curtain" {
                    render::render_curtain_sections(&results)
                } else {
                    format!(
                        r#"<div class="products" role="list">
{}
</div>"#,
                        render::render_cards(&results)
                    )
                };
                (Some(results.len()), body)
            }
        };

        let count = count
            .map(|n| {
                format!(
                    r#"<p class="results-count" aria-live="polite">{}</p>"#,
                    render::results_text(n)
                )
            })
            .unwrap_or_default();
        let active = match self.filter.active_count() {
            0 => String::new(),
            n => format!(r#"<span class="active-filters">{n} active</span>"#),
        };

        format!(
            r#"<section id="products-container" class="products-{view}">
{count}{active}
{body}
</section>"#,
            view = self.view.as_str(),
        )
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn into_prefs(self) -> P {
        self.prefs
    }
}
