// src/app/ui/topbar.rs
use eframe::egui as eg;

use crate::app::types::{Screen, SuggestMsg};
use crate::tmdb::{PAGE_SIZE, SUGGESTION_CAP};

impl crate::app::MarqueeApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui) {
        let mut search_anchor: Option<eg::Rect> = None;

        ui.horizontal(|ui| {
            // Wordmark doubles as the "show popular" reset.
            let logo = ui.add(
                eg::Button::new(eg::RichText::new("Marquee").heading().strong()).frame(false),
            );
            if logo.clicked() {
                self.show_popular();
            }

            ui.separator();

            if ui
                .selectable_label(self.screen == Screen::Browse, "Movies")
                .clicked()
            {
                self.show_popular();
            }
            if ui
                .selectable_label(self.screen == Screen::Favorites, "Favorites")
                .clicked()
            {
                self.screen = Screen::Favorites;
                self.favorites_visible = PAGE_SIZE;
                self.pending_reveal = None;
            }

            ui.separator();

            // Search box; suggestions render after the bar so they overlay
            // the grid.
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Search movies…")
                    .desired_width(220.0),
            );
            if resp.changed() {
                self.start_suggest_fetch();
            }
            if resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter)) {
                self.submit_search();
            }
            search_anchor = Some(resp.rect);

            ui.separator();

            if ui.button("Genres…").clicked() {
                self.show_genre_popup = true;
            }
            if !self.listing.selected_genres().is_empty()
                && ui
                    .small_button("Clear genres")
                    .on_hover_text("Drop the genre filter and show popular movies")
                    .clicked()
            {
                let action = self.listing.set_genre_filter(Vec::new());
                self.issue_catalog_fetch(action);
            }

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                let glyph = if self.theme_dark { "☀" } else { "🌙" };
                if ui
                    .button(glyph)
                    .on_hover_text("Toggle light/dark theme")
                    .clicked()
                {
                    self.theme_dark = !self.theme_dark;
                    self.apply_theme(ui.ctx());
                    self.mark_dirty();
                }
            });
        });

        if let Some(anchor) = search_anchor {
            self.ui_render_suggestions(ui, anchor);
        }
    }

    // ---------- TYPEAHEAD ----------

    fn ui_render_suggestions(&mut self, ui: &mut eg::Ui, anchor: eg::Rect) {
        if !self.show_suggestions || self.suggestions.is_empty() {
            return;
        }

        let mut picked: Option<String> = None;
        eg::Area::new(eg::Id::new("search_suggestions"))
            .fixed_pos(anchor.left_bottom() + eg::vec2(0.0, 4.0))
            .order(eg::Order::Foreground)
            .show(ui.ctx(), |ui| {
                eg::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(anchor.width());
                    for title in &self.suggestions {
                        if ui.selectable_label(false, title).clicked() {
                            picked = Some(title.clone());
                        }
                    }
                });
            });

        if let Some(title) = picked {
            self.search_query = title;
            self.show_suggestions = false;
        }
        // Click elsewhere dismisses the dropdown.
        if ui.input(|i| i.pointer.any_click())
            && !ui.input(|i| i.pointer.hover_pos()).is_some_and(|p| {
                anchor.expand2(eg::vec2(0.0, 240.0)).contains(p)
            })
        {
            self.show_suggestions = false;
        }
    }

    /// One suggestion fetch per keystroke; responses are tagged so a slow
    /// fetch for an old prefix can't clobber the current dropdown.
    pub(crate) fn start_suggest_fetch(&mut self) {
        let query = self.search_query.trim().to_string();
        self.suggest_seq += 1;
        if query.is_empty() {
            self.suggestions.clear();
            self.show_suggestions = false;
            return;
        }

        let seq = self.suggest_seq;
        let tx = self.suggest_tx.clone();
        let client = self.client.clone();
        std::thread::spawn(move || {
            let titles = match client.search(&query) {
                Ok(movies) => movies
                    .into_iter()
                    .take(SUGGESTION_CAP)
                    .map(|m| m.title)
                    .collect(),
                Err(_) => Vec::new(),
            };
            let _ = tx.send(SuggestMsg { seq, titles });
        });
    }

    pub(crate) fn poll_suggest(&mut self) {
        while let Ok(msg) = self.suggest_rx.try_recv() {
            if msg.seq != self.suggest_seq {
                continue;
            }
            self.show_suggestions = !msg.titles.is_empty();
            self.suggestions = msg.titles;
        }
    }

    // ---------- GENRE FILTER POPUP ----------

    pub(crate) fn ui_render_genre_popup(&mut self, ctx: &eg::Context) {
        if !self.show_genre_popup {
            return;
        }

        let genres = self.vocab.all().to_vec();
        let mut toggled: Option<u64> = None;
        let mut cleared = false;

        let mut open = self.show_genre_popup;
        eg::Window::new("Filter by Genre")
            .collapsible(false)
            .resizable(true)
            .default_width(260.0)
            .open(&mut open)
            .show(ctx, |ui| {
                if !self.vocab.is_loaded() {
                    ui.horizontal(|ui| {
                        ui.add(eg::Spinner::new().size(14.0));
                        ui.label("Loading genres…");
                    });
                    return;
                }

                let none_selected = self.listing.selected_genres().is_empty();
                if ui.selectable_label(none_selected, "All Genres").clicked() && !none_selected {
                    cleared = true;
                }
                ui.separator();

                eg::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                    for genre in &genres {
                        let selected = self.listing.selected_genres().contains(&genre.id);
                        if ui.selectable_label(selected, &genre.name).clicked() {
                            toggled = Some(genre.id);
                        }
                    }
                });
            });
        self.show_genre_popup = open;

        // The selection also narrows the Favorites view, so don't yank the
        // user back to Browse; the browse grid picks the results up when
        // they navigate there.
        if cleared {
            let action = self.listing.set_genre_filter(Vec::new());
            self.issue_catalog_fetch(action);
        } else if let Some(id) = toggled {
            let action = self.listing.toggle_genre(id);
            self.issue_catalog_fetch(action);
        }
    }

    // ---------- shared transitions ----------

    pub(crate) fn show_popular(&mut self) {
        self.screen = Screen::Browse;
        self.search_query.clear();
        self.suggestions.clear();
        self.show_suggestions = false;
        self.status_line.clear();
        let action = self.listing.begin_popular();
        self.issue_catalog_fetch(action);
    }

    pub(crate) fn submit_search(&mut self) {
        let query = self.search_query.trim().to_string();
        if query.is_empty() {
            return;
        }
        self.screen = Screen::Browse;
        self.show_suggestions = false;
        self.status_line.clear();

        self.catalog_seq += 1;
        self.pending_reveal = None;
        let seq = self.catalog_seq;
        let tx = self.catalog_tx.clone();
        let client = self.client.clone();
        std::thread::spawn(move || {
            use crate::app::types::{CatalogMsg, FetchKind};
            let msg = match client.search(&query) {
                Ok(movies) => CatalogMsg::Loaded {
                    seq,
                    kind: FetchKind::Search,
                    movies,
                    total_pages: None,
                },
                Err(error) => CatalogMsg::Failed {
                    seq,
                    kind: FetchKind::Search,
                    error,
                },
            };
            let _ = tx.send(msg);
        });
    }
}
