// src/app/mod.rs — search session + trending strip + poster grid

// ---- Standard lib imports ----
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---- Crates ----
use eframe::egui as eg;
use tracing::{info, warn};

// ---- Local modules ----
pub mod catalog;
pub mod debounce;
pub mod ledger;
pub mod posters;
pub mod search;
pub mod trending;
pub mod types;
pub mod ui;

pub use types::*;

use crate::app::ledger::{PopularityLedger, SqliteLedger};
use crate::app::posters::PosterLoader;
use crate::app::search::SearchSession;
use crate::app::trending::TrendingAggregator;
use crate::config::{AppConfig, ConfigError, Credential};

// ---- Tunables ----
const POSTER_REPAINT_MS: u64 = 60;

pub struct ScoutApp {
    // search box contents (live, not debounced)
    search_text: String,

    session: SearchSession,
    trending: TrendingAggregator,
    posters: Option<PosterLoader>,

    image_base_url: String,
    poster_width_ui: f32,
}

impl ScoutApp {
    pub fn new(cfg: &AppConfig, credential: Result<Credential, ConfigError>) -> Self {
        let timeout = Duration::from_secs(cfg.request_timeout_secs);

        let catalog = catalog::catalog_for(&cfg.api_base_url, credential, timeout);

        let ledger: Arc<dyn PopularityLedger> = Arc::new(SqliteLedger::new(
            cfg.ledger_db_path.clone(),
            cfg.image_base_url.clone(),
        ));
        info!("Popularity ledger at {}", cfg.ledger_db_path.display());

        let posters = match PosterLoader::start(cfg.poster_workers, timeout) {
            Ok(loader) => Some(loader),
            Err(err) => {
                warn!("Poster loader disabled: {err}");
                None
            }
        };

        Self {
            search_text: String::new(),
            session: SearchSession::start(
                catalog,
                Arc::clone(&ledger),
                Duration::from_millis(cfg.debounce_ms),
            ),
            trending: TrendingAggregator::start(ledger, cfg.trending_limit),
            posters,
            image_base_url: cfg.image_base_url.clone(),
            poster_width_ui: 150.0,
        }
    }

    pub(crate) fn poster_texture(&mut self, url: Option<&str>) -> Option<eg::TextureHandle> {
        let url = url?;
        let loader = self.posters.as_mut()?;
        loader.request(url);
        loader.texture(url).cloned()
    }
}

impl eframe::App for ScoutApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        self.session.pump(Instant::now());
        self.trending.poll();
        if let Some(loader) = self.posters.as_mut() {
            loader.poll(ctx);
        }

        eg::CentralPanel::default().show(ctx, |ui| {
            self.ui_render_header(ui);
            self.ui_render_trending(ui);
            self.ui_render_results(ui);
        });

        // The text edit may have changed this frame.
        let now = Instant::now();
        self.session.input_changed(&self.search_text, now);

        let mut wake = self.session.next_wakeup(now);
        let posters_busy = self.posters.as_ref().is_some_and(PosterLoader::has_pending);
        if posters_busy || self.trending.is_pending() {
            let poster_wake = Duration::from_millis(POSTER_REPAINT_MS);
            wake = Some(wake.map_or(poster_wake, |w| w.min(poster_wake)));
        }
        if let Some(after) = wake {
            ctx.request_repaint_after(after);
        }
    }
}
