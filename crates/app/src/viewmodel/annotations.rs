//! "My annotations" screen: every annotation the user wrote, across videos.

use std::collections::HashSet;
use std::sync::Arc;

use perspecto_core::optimistic::remove_tentatively;
use perspecto_db::models::Annotation;
use perspecto_db::repositories::AnnotationRepo;
use tokio::sync::watch;

use super::{error_message, InFlight};
use crate::view_state::annotations::{filter_and_sort, AnnotationSort};
use crate::view_state::cards::{settle, CardListState};

const FETCH_FALLBACK: &str = "Failed to fetch annotations";

#[derive(Debug, Clone)]
pub struct AnnotationsState {
    pub annotations: Vec<Annotation>,
    pub query: String,
    pub sort: AnnotationSort,
    /// Derived from `annotations`, `query` and `sort`.
    pub visible: Vec<Annotation>,
    pub cards: CardListState,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for AnnotationsState {
    fn default() -> Self {
        Self {
            annotations: Vec::new(),
            query: String::new(),
            sort: AnnotationSort::default(),
            visible: Vec::new(),
            cards: CardListState::new(),
            // The first fetch starts as soon as the screen opens.
            is_loading: true,
            error: None,
        }
    }
}

/// State holder for the annotations screen.
#[derive(Clone)]
pub struct AnnotationsViewModel {
    repo: AnnotationRepo,
    state: Arc<watch::Sender<AnnotationsState>>,
}

impl AnnotationsViewModel {
    pub fn new(repo: AnnotationRepo) -> Self {
        let (state, _) = watch::channel(AnnotationsState::default());
        Self {
            repo,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AnnotationsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AnnotationsState {
        self.state.borrow().clone()
    }

    pub fn visible(&self) -> Vec<Annotation> {
        self.state.borrow().visible.clone()
    }

    pub fn set_query(&self, query: &str) {
        self.update(|s| s.query = query.to_string());
    }

    pub fn set_sort(&self, sort: AnnotationSort) {
        self.update(|s| s.sort = sort);
    }

    // ---- cards ----

    /// A swipe on `id` was released at `offset` with `velocity`.
    pub fn on_card_released(&self, id: &str, offset: f32, velocity: f32) {
        self.update(|s| s.cards.on_settled(id, settle(offset, velocity)));
    }

    pub fn on_card_click(&self, id: &str) {
        self.update(|s| s.cards.on_click(id));
    }

    // ---- remote operations ----

    pub async fn fetch(&self) {
        self.update(|s| {
            s.is_loading = true;
            s.error = None;
        });
        let in_flight = InFlight::new(&self.state, |s: &mut AnnotationsState| s.is_loading = false);
        let result = self.repo.list_for_current_user().await;
        in_flight.finish();
        self.update(|s| {
            match result {
                Ok(annotations) => s.annotations = annotations,
                Err(e) => {
                    tracing::warn!(error = %e, "Annotation fetch failed");
                    s.error = Some(error_message(&e, FETCH_FALLBACK));
                }
            }
            s.is_loading = false;
        });
    }

    /// Delete an annotation.
    ///
    /// The card disappears at once. If the backend refuses, the error is
    /// shown and the list is replaced with a fresh fetch.
    pub async fn delete_annotation(&self, id: &str) {
        let mut edit = None;
        self.update(|s| {
            edit = Some(remove_tentatively(&mut s.annotations, |a| a.id == id));
            s.cards.on_deleted(id);
        });
        let Some(edit) = edit else {
            return;
        };

        match self.repo.delete(id).await {
            Ok(()) => {
                let _ = edit.confirm();
            }
            Err(e) => {
                tracing::warn!(annotation_id = id, error = %e, "Annotation delete failed");
                let message = format!("Failed to delete: {e}");
                match self.repo.list_for_current_user().await {
                    Ok(fresh) => self.update(|s| {
                        edit.reconcile(&mut s.annotations, fresh);
                        s.error = Some(message);
                    }),
                    Err(fetch_err) => {
                        tracing::warn!(error = %fetch_err, "Re-fetch after failed delete failed");
                        self.update(|s| {
                            edit.restore(&mut s.annotations);
                            s.error = Some(message);
                        });
                    }
                }
            }
        }
    }

    // ---- private helpers ----

    fn update(&self, f: impl FnOnce(&mut AnnotationsState)) {
        self.state.send_modify(|s| {
            f(s);
            s.visible = filter_and_sort(&s.annotations, &s.query, s.sort);
            let ids: HashSet<&str> = s.annotations.iter().map(|a| a.id.as_str()).collect();
            s.cards.retain(&ids);
        });
    }
}
