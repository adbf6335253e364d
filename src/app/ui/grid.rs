// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::app::types::Movie;
use crate::app::{RevealJob, RevealTarget};

use super::{H_SPACING, V_SPACING};

/// Everything a card needs, captured up front so painting never borrows
/// app state.
pub(crate) struct Card {
    pub movie: Movie,
    pub marked: bool,
    pub genre_line: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkGlyph {
    Heart,  // browse: toggle in/out of favorites
    Remove, // favorites view: explicit removal
}

#[derive(Default)]
pub(crate) struct GridOutcome {
    pub open: Option<u64>,
    pub mark: Option<usize>,
}

impl crate::app::MarqueeApp {
    // ---------- BROWSE ----------

    pub(crate) fn ui_render_browse(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let heading = if self.listing.is_search() {
            "Results".to_string()
        } else if self.listing.is_genre_filter() {
            let names = self.vocab.joined_names(self.listing.selected_genres());
            if names.is_empty() {
                "Movies by Genre".to_string()
            } else {
                format!("Movies by Genre: {names}")
            }
        } else {
            "Popular Movies".to_string()
        };
        ui.heading(heading);
        if !self.status_line.is_empty() {
            ui.label(eg::RichText::new(&self.status_line).weak());
        }
        ui.add_space(4.0);

        let cards: Vec<Card> = self
            .listing
            .visible()
            .iter()
            .map(|m| Card {
                marked: self.favorites.is_favorite(m.id),
                genre_line: None,
                movie: m.clone(),
            })
            .collect();

        if cards.is_empty() && self.listing.loading() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.add(eg::Spinner::new().size(16.0));
                ui.label("Loading movies…");
            });
            return;
        }

        let busy = self.listing.loading() || self.pending_reveal.is_some();
        let can_load_more = self.listing.can_load_more();

        let mut load_more = false;
        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let outcome = self.draw_card_grid(ui, ctx, &cards, MarkGlyph::Heart);
                if let Some(idx) = outcome.mark {
                    let movie = cards[idx].movie.clone();
                    self.toggle_favorite(&movie);
                }
                if let Some(id) = outcome.open {
                    self.open_detail(id);
                }
                load_more = Self::draw_footer(ui, busy, can_load_more, !cards.is_empty());
            });

        if load_more {
            if self.listing.is_search() {
                self.pending_reveal = Some(RevealJob::new(RevealTarget::Search));
            } else if let Some(page) = self.listing.next_page_request() {
                self.issue_catalog_fetch(crate::app::listing::FetchAction::Popular { page });
            }
        }
    }

    // ---------- FAVORITES ----------

    pub(crate) fn ui_render_favorites(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        ui.heading("Favorites");
        ui.add_space(4.0);
        ui.add(
            eg::TextEdit::singleline(&mut self.favorites_filter)
                .hint_text("Search favorites…")
                .desired_width(260.0),
        );
        ui.add_space(6.0);

        let selected = self.listing.selected_genres().to_vec();
        let cards: Vec<Card> = self
            .favorites
            .filtered(&self.favorites_filter, &selected)
            .into_iter()
            .map(|m| Card {
                marked: true,
                genre_line: Some(self.vocab.joined_names(&m.genre_ids)),
                movie: m.clone(),
            })
            .collect();

        if cards.is_empty() {
            let msg = if self.favorites.is_empty() {
                "No favorites yet."
            } else {
                "No favorites match your search or selected genres."
            };
            ui.add_space(24.0);
            ui.vertical_centered(|ui| ui.label(eg::RichText::new(msg).weak()));
            return;
        }

        let total = cards.len();
        let visible = total.min(self.favorites_visible);
        let busy = self.pending_reveal.is_some();

        let mut load_more = false;
        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let outcome = self.draw_card_grid(ui, ctx, &cards[..visible], MarkGlyph::Remove);
                if let Some(idx) = outcome.mark {
                    self.remove_favorite(cards[idx].movie.id);
                }
                if let Some(id) = outcome.open {
                    self.open_detail(id);
                }
                load_more = Self::draw_footer(ui, busy, total > visible, true);
            });

        if load_more {
            self.pending_reveal = Some(RevealJob::new(RevealTarget::Favorites));
        }
    }

    // ---------- shared pieces ----------

    fn draw_footer(ui: &mut eg::Ui, busy: bool, can_load_more: bool, any_items: bool) -> bool {
        ui.add_space(12.0);
        let mut clicked = false;
        ui.vertical_centered(|ui| {
            if busy {
                ui.add_enabled(false, eg::Button::new("Loading…"));
            } else if can_load_more {
                clicked = ui.button("Load More").clicked();
            } else if any_items {
                ui.label(eg::RichText::new("No more movies to load.").weak());
            }
        });
        ui.add_space(12.0);
        clicked
    }

    fn draw_card_grid(
        &mut self,
        ui: &mut eg::Ui,
        ctx: &eg::Context,
        cards: &[Card],
        glyph: MarkGlyph,
    ) -> GridOutcome {
        let mut outcome = GridOutcome::default();

        let card_w: f32 = self.poster_width_ui;
        let text_h: f32 = if matches!(glyph, MarkGlyph::Remove) {
            76.0
        } else {
            60.0
        };
        let card_h: f32 = card_w * 1.5 + text_h;

        let avail = ui.available_width();
        let cols = ((avail + H_SPACING) / (card_w + H_SPACING)).floor().max(1.0) as usize;

        let used = cols as f32 * card_w + (cols.saturating_sub(1)) as f32 * H_SPACING;
        let left_pad = ((avail - used) * 0.5).max(0.0);
        if left_pad > 0.0 {
            ui.add_space(left_pad);
        }

        let mut uploads_left = crate::app::posters::MAX_UPLOADS_PER_FRAME;

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);

            for (col, card) in cards.iter().enumerate() {
                if col > 0 && col % cols == 0 {
                    ui.end_row();
                }

                ui.allocate_ui_with_layout(
                    eg::vec2(card_w, card_h),
                    eg::Layout::top_down(eg::Align::Min),
                    |ui| {
                        ui.set_min_size(eg::vec2(card_w, card_h));
                        let rect = ui.max_rect();

                        let poster_rect = eg::Rect::from_min_max(
                            rect.min,
                            eg::pos2(rect.min.x + card_w, rect.min.y + card_w * 1.5),
                        );
                        let text_rect = eg::Rect::from_min_max(
                            eg::pos2(rect.min.x, poster_rect.max.y),
                            rect.max,
                        );

                        // card first, mark second: the mark is topmost where
                        // they overlap
                        let card_id = eg::Id::new(("card", card.movie.id, col));
                        let card_resp = ui.interact(rect, card_id, eg::Sense::click());

                        let mark_rect = eg::Rect::from_min_size(
                            eg::pos2(poster_rect.right() - 28.0, poster_rect.top() + 6.0),
                            eg::vec2(22.0, 22.0),
                        );
                        let mark_id = eg::Id::new(("mark", card.movie.id, col));
                        let mark_resp = ui.interact(mark_rect, mark_id, eg::Sense::click());

                        // poster
                        let tex = card.movie.poster_path.as_deref().and_then(|p| {
                            let url = self.client.image_url(p);
                            self.posters.texture(ctx, &url, &mut uploads_left)
                        });
                        if let Some(tex) = tex {
                            ui.painter().image(
                                tex.id(),
                                poster_rect,
                                eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                                eg::Color32::WHITE,
                            );
                        } else {
                            ui.painter()
                                .rect_filled(poster_rect, 6.0, eg::Color32::from_gray(40));
                        }

                        // favorite / remove mark
                        let (mark_text, mark_color) = match glyph {
                            MarkGlyph::Heart if card.marked => {
                                ("♥", eg::Color32::from_rgb(229, 9, 20))
                            }
                            MarkGlyph::Heart => ("♡", eg::Color32::WHITE),
                            MarkGlyph::Remove => ("✖", eg::Color32::WHITE),
                        };
                        ui.painter().text(
                            mark_rect.center(),
                            eg::Align2::CENTER_CENTER,
                            mark_text,
                            eg::FontId::proportional(18.0),
                            mark_color,
                        );

                        // label block
                        let mut label = card.movie.title.clone();
                        if !card.movie.release_date.is_empty() {
                            label.push_str(&format!("\nRelease: {}", card.movie.release_date));
                        }
                        label.push_str(&format!("\n⭐ {:.1}", card.movie.vote_average));
                        if let Some(genres) = card.genre_line.as_deref() {
                            if !genres.is_empty() {
                                label.push_str(&format!("\n{genres}"));
                            }
                        }
                        ui.allocate_ui_at_rect(text_rect, |ui| {
                            ui.add(eg::Label::new(eg::RichText::new(label).size(13.0)).wrap());
                        });

                        if mark_resp.clicked() {
                            outcome.mark = Some(col);
                        } else if card_resp.clicked() {
                            outcome.open = Some(card.movie.id);
                        }
                    },
                );
            }

            ui.end_row();
        });

        outcome
    }
}
