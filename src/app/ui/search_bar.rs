// src/app/ui/search_bar.rs
use eframe::egui as eg;

impl crate::app::ScoutApp {
    // ---------- HEADER + SEARCH BOX ----------
    pub(crate) fn ui_render_header(&mut self, ui: &mut eg::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(18.0);
            ui.heading(
                eg::RichText::new("Find Movies You'll Enjoy")
                    .size(30.0)
                    .strong(),
            );
            ui.add_space(10.0);

            ui.add(
                eg::TextEdit::singleline(&mut self.search_text)
                    .hint_text("Search for a movie or TV show")
                    .desired_width(420.0),
            );

            let settled = self.session.settled_query().trim();
            let caption = if settled.is_empty() {
                "Showing popular movies".to_string()
            } else {
                format!("Results for “{settled}”")
            };
            ui.label(eg::RichText::new(caption).weak());
        });
    }
}
