// src/main.rs
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use reelscout::app::ScoutApp;
use reelscout::config;

fn pick_renderer() -> eframe::Renderer {
    match env::var("REELSCOUT_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            {
                eframe::Renderer::Wgpu
            }
            #[cfg(not(target_os = "windows"))]
            {
                eframe::Renderer::Glow
            }
        }
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cfg = config::config();
    let credential = config::credential();
    match &credential {
        Ok(_) => info!("Catalog credential loaded"),
        Err(err) => error!("{err}"),
    }

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_title("ReelScout"),
        ..Default::default()
    };

    match eframe::run_native(
        "ReelScout",
        options,
        Box::new(move |_cc| Ok(Box::new(ScoutApp::new(cfg, credential)))),
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: try REELSCOUT_RENDERER=wgpu or glow.");
            Err(e)
        }
    }
}
