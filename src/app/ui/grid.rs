// src/app/ui/grid.rs
use eframe::egui as eg;

pub const H_SPACING: f32 = 8.0;
pub const V_SPACING: f32 = 12.0;
const TEXT_H: f32 = 48.0;

struct MovieCard {
    title: String,
    poster_url: Option<String>,
    meta: String,
}

pub(crate) fn paint_texture(p: &eg::Painter, rect: eg::Rect, tex: &eg::TextureHandle) {
    p.image(
        tex.id(),
        rect,
        eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
        eg::Color32::WHITE,
    );
}

pub(crate) fn paint_placeholder(p: &eg::Painter, rect: eg::Rect, label: &str) {
    p.rect_filled(rect, 6.0, eg::Color32::from_gray(40));
    p.with_clip_rect(rect).text(
        rect.center(),
        eg::Align2::CENTER_CENTER,
        label,
        eg::FontId::proportional(12.0),
        eg::Color32::from_gray(170),
    );
}

impl crate::app::ScoutApp {
    pub(crate) fn ui_render_grid(&mut self, ui: &mut eg::Ui) {
        let cards: Vec<MovieCard> = self
            .session
            .orchestrator()
            .results()
            .iter()
            .map(|m| MovieCard {
                title: m.title.clone(),
                poster_url: m.poster_url(&self.image_base_url),
                meta: format!(
                    "★ {}  •  {}  •  {}",
                    m.rating_label(),
                    m.language_label(),
                    m.year_label()
                ),
            })
            .collect();

        let card_w: f32 = self.poster_width_ui;
        let card_h: f32 = card_w * 1.5 + TEXT_H;

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let avail = ui.available_width();
                let cols = ((avail + H_SPACING) / (card_w + H_SPACING))
                    .floor()
                    .max(1.0) as usize;

                for row in cards.chunks(cols) {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);
                        for card in row {
                            self.ui_render_card(ui, card, card_w, card_h);
                        }
                    });
                    ui.add_space(V_SPACING);
                }
            });
    }

    fn ui_render_card(&mut self, ui: &mut eg::Ui, card: &MovieCard, card_w: f32, card_h: f32) {
        let (rect, resp) = ui.allocate_exact_size(eg::vec2(card_w, card_h), eg::Sense::hover());

        let poster_rect = eg::Rect::from_min_max(
            rect.min,
            eg::pos2(rect.min.x + card_w, rect.min.y + card_w * 1.5),
        );
        let text_rect = eg::Rect::from_min_max(eg::pos2(rect.min.x, poster_rect.max.y), rect.max);

        match self.poster_texture(card.poster_url.as_deref()) {
            Some(tex) => paint_texture(ui.painter(), poster_rect, &tex),
            None => paint_placeholder(ui.painter(), poster_rect, "No poster"),
        }

        let painter = ui.painter().with_clip_rect(text_rect);
        painter.text(
            text_rect.left_top() + eg::vec2(2.0, 4.0),
            eg::Align2::LEFT_TOP,
            &card.title,
            eg::FontId::proportional(14.0),
            ui.visuals().strong_text_color(),
        );
        painter.text(
            text_rect.left_top() + eg::vec2(2.0, 24.0),
            eg::Align2::LEFT_TOP,
            &card.meta,
            eg::FontId::proportional(12.0),
            ui.visuals().weak_text_color(),
        );

        resp.on_hover_text(card.title.as_str());
    }
}
