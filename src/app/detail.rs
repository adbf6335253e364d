// src/app/detail.rs
use std::sync::mpsc;

use eframe::egui as eg;
use itertools::Itertools;

use crate::app::types::{DetailMsg, MovieDetail};
use crate::tmdb;

#[derive(Clone)]
pub enum DetailPhase {
    Loading,
    Ready(Box<MovieDetail>),
    NotFound,
    Failed(String),
}

#[derive(Clone)]
pub struct DetailView {
    pub movie_id: u64,
    pub phase: DetailPhase,
    pub trailer_key: Option<String>,
}

impl crate::app::MarqueeApp {
    /// Open the detail panel for a movie and fetch its record plus videos
    /// on a worker thread. Clicking a different card while one is in
    /// flight simply supersedes it; stale messages are dropped by id.
    pub(crate) fn open_detail(&mut self, movie_id: u64) {
        if self
            .detail
            .as_ref()
            .is_some_and(|view| view.movie_id == movie_id)
        {
            return;
        }

        self.detail = Some(DetailView {
            movie_id,
            phase: DetailPhase::Loading,
            trailer_key: None,
        });

        let (tx, rx) = mpsc::channel::<DetailMsg>();
        self.detail_rx = Some(rx);

        let client = self.client.clone();
        std::thread::spawn(move || {
            match client.movie_detail(movie_id) {
                Ok(detail) => {
                    let _ = tx.send(DetailMsg::Loaded {
                        movie_id,
                        detail: Box::new(detail),
                    });
                }
                Err(e) => {
                    let _ = tx.send(DetailMsg::Failed { movie_id, error: e });
                    return;
                }
            }
            if let Ok(videos) = client.movie_videos(movie_id) {
                let _ = tx.send(DetailMsg::Videos { movie_id, videos });
            }
        });
    }

    pub(crate) fn poll_detail(&mut self) {
        loop {
            let msg = {
                let Some(rx) = self.detail_rx.as_ref() else {
                    return;
                };
                match rx.try_recv() {
                    Ok(m) => m,
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        self.detail_rx = None;
                        break;
                    }
                }
            };

            let Some(view) = self.detail.as_mut() else {
                continue;
            };

            match msg {
                DetailMsg::Loaded { movie_id, detail } if movie_id == view.movie_id => {
                    view.phase = if detail.is_found() {
                        DetailPhase::Ready(detail)
                    } else {
                        DetailPhase::NotFound
                    };
                }
                DetailMsg::Videos { movie_id, videos } if movie_id == view.movie_id => {
                    view.trailer_key = tmdb::pick_trailer(&videos).map(|v| v.key.clone());
                }
                DetailMsg::Failed { movie_id, error } if movie_id == view.movie_id => {
                    view.phase = DetailPhase::Failed(error);
                }
                // superseded fetch
                _ => {}
            }
        }
    }

    pub(crate) fn ui_render_detail_panel(&mut self, ctx: &eg::Context) {
        let Some(view) = self.detail.clone() else {
            return;
        };

        eg::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(360.0)
            .min_width(280.0)
            .max_width(520.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.heading("Details");
                    ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            self.detail = None;
                            self.detail_rx = None;
                        }
                    });
                });
                ui.separator();

                match &view.phase {
                    DetailPhase::Loading => {
                        ui.add_space(20.0);
                        ui.vertical_centered(|ui| {
                            ui.add(eg::Spinner::new().size(16.0));
                            ui.label("Loading…");
                        });
                    }
                    DetailPhase::NotFound => {
                        ui.add_space(20.0);
                        ui.label("Movie not found.");
                    }
                    DetailPhase::Failed(e) => {
                        ui.add_space(20.0);
                        ui.label(format!("Could not load details: {e}"));
                    }
                    DetailPhase::Ready(detail) => {
                        self.render_detail_body(ui, ctx, detail, view.trailer_key.as_deref());
                    }
                }
            });
    }

    fn render_detail_body(
        &mut self,
        ui: &mut eg::Ui,
        ctx: &eg::Context,
        detail: &MovieDetail,
        trailer_key: Option<&str>,
    ) {
        ui.add_space(4.0);
        let avail_w = ui.available_width().clamp(120.0, 400.0);
        let poster_size = eg::vec2(avail_w, avail_w * 1.5);

        let mut uploads_left = crate::app::posters::MAX_UPLOADS_PER_FRAME;
        let tex = detail.poster_path.as_deref().and_then(|p| {
            let url = self.client.image_url(p);
            self.posters.texture(ctx, &url, &mut uploads_left)
        });
        if let Some(tex) = tex {
            ui.image((tex.id(), poster_size));
        } else {
            let (rect, _resp) = ui.allocate_exact_size(poster_size, eg::Sense::hover());
            ui.painter()
                .rect_filled(rect, 8.0, eg::Color32::from_gray(40));
        }

        ui.add_space(8.0);

        let year = crate::app::types::release_year_of(&detail.release_date);
        let title = match year {
            Some(y) => format!("{} ({})", detail.title, y),
            None => detail.title.clone(),
        };
        ui.heading(title);

        if !detail.release_date.is_empty() || detail.runtime.is_some() {
            let runtime = detail
                .runtime
                .map(|m| format!("{m} min"))
                .unwrap_or_else(|| "—".into());
            ui.label(
                eg::RichText::new(format!("{}  •  {}", detail.release_date, runtime)).weak(),
            );
        }
        ui.label(eg::RichText::new(format!("⭐ {:.1}", detail.vote_average)).weak());

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(8.0);

        if !detail.overview.is_empty() {
            ui.label(&detail.overview);
            ui.add_space(8.0);
        }

        ui.label(eg::RichText::new("Genres").strong());
        if detail.genres.is_empty() {
            ui.label("—");
        } else {
            ui.label(detail.genres.iter().map(|g| g.name.as_str()).join(", "));
        }

        if let Some(key) = trailer_key {
            ui.add_space(10.0);
            if ui.button("▶ Play Trailer").clicked() {
                ctx.open_url(eg::OpenUrl::new_tab(tmdb::trailer_url(key)));
            }
        }
    }
}
