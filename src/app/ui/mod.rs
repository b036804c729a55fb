// src/app/ui/mod.rs
pub mod grid;
pub mod search_bar;

use eframe::egui as eg;

use crate::app::search::NO_MOVIES_FOUND;

pub const TRENDING_POSTER_W: f32 = 96.0;

impl crate::app::ScoutApp {
    // ---------- TRENDING ----------
    pub(crate) fn ui_render_trending(&mut self, ui: &mut eg::Ui) {
        // No records (or a failed read) hides the whole section.
        if !self.trending.is_visible() {
            return;
        }

        let cards: Vec<(usize, String, Option<String>)> = self
            .trending
            .records()
            .iter()
            .enumerate()
            .map(|(i, r)| (i + 1, r.search_term.clone(), r.poster_url.clone()))
            .collect();

        ui.add_space(12.0);
        ui.heading("Trending Movies");
        ui.add_space(6.0);

        eg::ScrollArea::horizontal()
            .id_source("trending_strip")
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for (rank, term, poster_url) in cards {
                        ui.label(eg::RichText::new(rank.to_string()).size(48.0).strong().weak());

                        let size = eg::vec2(TRENDING_POSTER_W, TRENDING_POSTER_W * 1.5);
                        let (rect, resp) = ui.allocate_exact_size(size, eg::Sense::hover());
                        match self.poster_texture(poster_url.as_deref()) {
                            Some(tex) => grid::paint_texture(ui.painter(), rect, &tex),
                            None => grid::paint_placeholder(ui.painter(), rect, &term),
                        }
                        resp.on_hover_text(term.as_str());
                        ui.add_space(12.0);
                    }
                });
            });
    }

    // ---------- RESULTS ----------
    pub(crate) fn ui_render_results(&mut self, ui: &mut eg::Ui) {
        ui.add_space(16.0);
        ui.heading("All Movies");
        ui.add_space(6.0);

        let orch = self.session.orchestrator();
        if orch.is_loading() {
            ui.add(eg::Spinner::new().size(24.0));
            return;
        }
        if let Some(msg) = orch.message() {
            let color = if msg == NO_MOVIES_FOUND {
                ui.visuals().warn_fg_color
            } else {
                ui.visuals().error_fg_color
            };
            ui.label(eg::RichText::new(msg).color(color));
            return;
        }

        self.ui_render_grid(ui);
    }
}
