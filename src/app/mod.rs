// src/app/mod.rs — app state + event loop. All fetches run on worker
// threads; the update loop drains their channels, ticks timers, and renders.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use eframe::egui as eg;
use tracing::warn;

pub mod detail;
pub mod favorites;
pub mod filters;
pub mod genres;
pub mod listing;
pub mod posters;
pub mod prefs;
pub mod types;
pub mod ui;

use crate::app::detail::DetailView;
use crate::app::favorites::Favorites;
use crate::app::genres::GenreVocab;
use crate::app::listing::{FetchAction, Listing};
use crate::app::posters::PosterLoader;
use crate::app::types::{
    CatalogMsg, DetailMsg, FetchKind, GenreVocabMsg, Screen, SuggestMsg, Toast,
};
use crate::config::load_config;
use crate::tmdb::{CatalogClient, PAGE_SIZE};

/// Simulated load delay for the client-side "Load More" reveals.
const REVEAL_DELAY: Duration = Duration::from_millis(400);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RevealTarget {
    Search,
    Favorites,
}

/// A pending slice reveal; re-triggering replaces it and view switches
/// cancel it.
pub(crate) struct RevealJob {
    deadline: Instant,
    target: RevealTarget,
}

impl RevealJob {
    pub(crate) fn new(target: RevealTarget) -> Self {
        Self {
            deadline: Instant::now() + REVEAL_DELAY,
            target,
        }
    }
}

pub struct MarqueeApp {
    // gateway + image pipeline
    client: CatalogClient,
    posters: PosterLoader,

    // core state
    listing: Listing,
    favorites: Favorites,
    vocab: GenreVocab,

    // navigation
    screen: Screen,
    detail: Option<DetailView>,

    // search box + typeahead
    search_query: String,
    suggestions: Vec<String>,
    show_suggestions: bool,
    suggest_seq: u64,

    // favorites view
    favorites_filter: String,
    favorites_visible: usize,

    // transient ui
    toast: Option<Toast>,
    pending_reveal: Option<RevealJob>,
    status_line: String,
    show_genre_popup: bool,

    // prefs
    theme_dark: bool,
    poster_width_ui: f32,
    prefs_dirty: bool,
    prefs_last_write: Instant,

    // plumbing
    catalog_seq: u64,
    catalog_tx: Sender<CatalogMsg>,
    catalog_rx: Receiver<CatalogMsg>,
    suggest_tx: Sender<SuggestMsg>,
    suggest_rx: Receiver<SuggestMsg>,
    genre_rx: Option<Receiver<GenreVocabMsg>>,
    detail_rx: Option<Receiver<DetailMsg>>,

    did_init: bool,
}

impl MarqueeApp {
    pub fn new() -> Result<Self, String> {
        let cfg = load_config();
        let client = CatalogClient::new(&cfg)?;
        let favorites = Favorites::load_default();

        let (catalog_tx, catalog_rx) = mpsc::channel::<CatalogMsg>();
        let (suggest_tx, suggest_rx) = mpsc::channel::<SuggestMsg>();

        let mut app = Self {
            client,
            posters: PosterLoader::new(),

            listing: Listing::default(),
            favorites,
            vocab: GenreVocab::default(),

            screen: Screen::Browse,
            detail: None,

            search_query: String::new(),
            suggestions: Vec::new(),
            show_suggestions: false,
            suggest_seq: 0,

            favorites_filter: String::new(),
            favorites_visible: PAGE_SIZE,

            toast: None,
            pending_reveal: None,
            status_line: String::new(),
            show_genre_popup: false,

            theme_dark: true,
            poster_width_ui: 150.0,
            prefs_dirty: false,
            prefs_last_write: Instant::now(),

            catalog_seq: 0,
            catalog_tx,
            catalog_rx,
            suggest_tx,
            suggest_rx,
            genre_rx: None,
            detail_rx: None,

            did_init: false,
        };
        app.load_prefs();
        Ok(app)
    }

    /// Spawn the network side of a listing transition. Bumping the sequence
    /// here is what invalidates every response still in flight for the
    /// previous view.
    pub(crate) fn issue_catalog_fetch(&mut self, action: FetchAction) {
        self.pending_reveal = None;
        self.status_line.clear();
        self.catalog_seq += 1;
        let seq = self.catalog_seq;
        let tx = self.catalog_tx.clone();
        let client = self.client.clone();

        match action {
            FetchAction::Popular { page } => {
                std::thread::spawn(move || {
                    let kind = FetchKind::PopularPage(page);
                    let msg = match client.popular(page) {
                        Ok(body) => CatalogMsg::Loaded {
                            seq,
                            kind,
                            movies: body.results,
                            total_pages: Some(body.total_pages),
                        },
                        Err(error) => CatalogMsg::Failed { seq, kind, error },
                    };
                    let _ = tx.send(msg);
                });
            }
            FetchAction::Discover { genre_ids } => {
                std::thread::spawn(move || {
                    let msg = match client.discover_by_genres(&genre_ids) {
                        Ok(movies) => CatalogMsg::Loaded {
                            seq,
                            kind: FetchKind::Genre,
                            movies,
                            total_pages: None,
                        },
                        Err(error) => CatalogMsg::Failed {
                            seq,
                            kind: FetchKind::Genre,
                            error,
                        },
                    };
                    let _ = tx.send(msg);
                });
            }
        }
    }

    fn poll_catalog(&mut self) {
        loop {
            let msg = match self.catalog_rx.try_recv() {
                Ok(m) => m,
                Err(mpsc::TryRecvError::Empty) | Err(mpsc::TryRecvError::Disconnected) => break,
            };

            match msg {
                CatalogMsg::Loaded {
                    seq,
                    kind,
                    movies,
                    total_pages,
                } => {
                    if seq != self.catalog_seq {
                        continue; // response from an abandoned view
                    }
                    self.status_line.clear();
                    match kind {
                        FetchKind::PopularPage(page) => {
                            self.listing
                                .popular_loaded(page, movies, total_pages.unwrap_or(1));
                        }
                        FetchKind::Search => self.listing.apply_search(movies),
                        FetchKind::Genre => self.listing.genre_loaded(movies),
                    }
                }
                CatalogMsg::Failed { seq, kind, error } => {
                    if seq != self.catalog_seq {
                        continue;
                    }
                    warn!("catalog fetch failed ({kind:?}): {error}");
                    self.status_line = "Couldn't reach the movie catalog.".to_string();
                    self.listing.load_failed(kind);
                }
            }
        }
    }

    fn tick_timers(&mut self) {
        let now = Instant::now();

        if self.toast.as_ref().is_some_and(|t| t.expired_at(now)) {
            self.toast = None;
        }

        if let Some(job) = self.pending_reveal.take() {
            if now >= job.deadline {
                match job.target {
                    RevealTarget::Search => {
                        self.listing.reveal_more_search();
                    }
                    RevealTarget::Favorites => {
                        self.favorites_visible += PAGE_SIZE;
                    }
                }
            } else {
                self.pending_reveal = Some(job);
            }
        }
    }

    pub(crate) fn apply_theme(&self, ctx: &eg::Context) {
        ctx.set_visuals(if self.theme_dark {
            eg::Visuals::dark()
        } else {
            eg::Visuals::light()
        });
    }

    fn ui_render_toast(&self, ctx: &eg::Context) {
        let Some(toast) = &self.toast else {
            return;
        };
        eg::Area::new(eg::Id::new("toast"))
            .anchor(eg::Align2::RIGHT_TOP, eg::vec2(-24.0, 24.0))
            .order(eg::Order::Foreground)
            .show(ctx, |ui| {
                eg::Frame::popup(&ctx.style()).show(ui, |ui| {
                    ui.label(eg::RichText::new(&toast.message).strong());
                });
            });
    }
}

impl eframe::App for MarqueeApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        // Keep frames moving: worker channels and timers are polled here.
        ctx.request_repaint();

        if !self.did_init {
            self.did_init = true;
            self.apply_theme(ctx);
            let action = self.listing.begin_popular();
            self.issue_catalog_fetch(action);
        }

        self.ensure_genre_vocab();
        self.poll_genre_vocab();
        self.poll_catalog();
        self.poll_suggest();
        self.poll_detail();
        self.posters.poll();
        self.tick_timers();
        self.maybe_save_prefs();

        self.ui_render_detail_panel(ctx);
        self.ui_render_genre_popup(ctx);

        eg::CentralPanel::default().show(ctx, |ui| {
            self.ui_render_topbar(ui);
            ui.separator();
            match self.screen {
                Screen::Browse => self.ui_render_browse(ui, ctx),
                Screen::Favorites => self.ui_render_favorites(ui, ctx),
            }
        });

        self.ui_render_toast(ctx);
    }
}
