// src/app/posters.rs
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use eframe::egui::{self as eg, ColorImage, TextureHandle};
use image::imageops::FilterType;
use image::GenericImageView;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::app::types::{PosterDone, PosterImage};

const RESIZE_MAX_W: u32 = 320;
const MAX_DONE_PER_FRAME: usize = 12;
const MAX_UPLOADS_PER_FRAME: usize = 4;

enum PosterSlot {
    Pending,
    Ready(TextureHandle),
    Failed,
}

/// Background poster downloads with textures uploaded on the UI thread.
/// Artwork lives in memory for the session only.
pub struct PosterLoader {
    work_tx: Sender<String>,
    done_rx: Receiver<PosterDone>,
    slots: HashMap<String, PosterSlot>,
    decoded: VecDeque<(String, PosterImage)>,
}

impl PosterLoader {
    pub fn start(workers: usize, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Arc::new(
            Client::builder()
                .user_agent("reelscout/posters")
                .timeout(timeout)
                .pool_max_idle_per_host(workers.max(1))
                .default_headers({
                    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                    let mut h = HeaderMap::new();
                    h.insert(
                        ACCEPT,
                        HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                    );
                    h
                })
                .build()?,
        );

        let (work_tx, work_rx) = mpsc::channel::<String>();
        let (done_tx, done_rx) = mpsc::channel::<PosterDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..workers.max(1) {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);

            thread::spawn(move || loop {
                let job = match work_rx.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => break,
                };
                let Ok(url) = job else {
                    break;
                };
                let result = fetch_poster(&client, &url);
                if done_tx.send(PosterDone { url, result }).is_err() {
                    break;
                }
            });
        }

        Ok(Self {
            work_tx,
            done_rx,
            slots: HashMap::new(),
            decoded: VecDeque::new(),
        })
    }

    /// Queue a poster once; later calls for the same URL are no-ops.
    pub fn request(&mut self, url: &str) {
        if self.slots.contains_key(url) {
            return;
        }
        if self.work_tx.send(url.to_string()).is_ok() {
            self.slots.insert(url.to_string(), PosterSlot::Pending);
        } else {
            self.slots.insert(url.to_string(), PosterSlot::Failed);
        }
    }

    pub fn texture(&self, url: &str) -> Option<&TextureHandle> {
        match self.slots.get(url) {
            Some(PosterSlot::Ready(tex)) => Some(tex),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.decoded.is_empty()
            || self
                .slots
                .values()
                .any(|s| matches!(s, PosterSlot::Pending))
    }

    /// Drain finished downloads and upload a few textures. Returns uploads done.
    pub fn poll(&mut self, ctx: &eg::Context) -> usize {
        for _ in 0..MAX_DONE_PER_FRAME {
            match self.done_rx.try_recv() {
                Ok(PosterDone { url, result }) => match result {
                    Ok(img) => self.decoded.push_back((url, img)),
                    Err(e) => {
                        debug!("Poster failed {url}: {e}");
                        self.slots.insert(url, PosterSlot::Failed);
                    }
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Poster workers stopped; remaining posters stay as placeholders");
                    break;
                }
            }
        }

        let mut uploaded = 0;
        while uploaded < MAX_UPLOADS_PER_FRAME {
            let Some((url, img)) = self.decoded.pop_front() else {
                break;
            };
            let color = ColorImage::from_rgba_unmultiplied(
                [img.width as usize, img.height as usize],
                &img.rgba,
            );
            let tex = ctx.load_texture(url.clone(), color, eg::TextureOptions::LINEAR);
            self.slots.insert(url, PosterSlot::Ready(tex));
            uploaded += 1;
        }
        uploaded
    }
}

fn fetch_poster(client: &Client, url: &str) -> Result<PosterImage, String> {
    let resp = client.get(url).send().map_err(|e| format!("GET {url}: {e}"))?;
    if !resp.status().is_success() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }
    let body = resp.bytes().map_err(|e| format!("read body: {e}"))?;
    decode_poster(&body)
}

/// Decode artwork bytes to RGBA, shrinking wide images to the card width.
pub fn decode_poster(bytes: &[u8]) -> Result<PosterImage, String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("decode: {e}"))?;
    let img = if img.width() > RESIZE_MAX_W {
        img.resize(RESIZE_MAX_W, u32::MAX, FilterType::Triangle)
    } else {
        img
    };
    let (width, height) = img.dimensions();
    Ok(PosterImage {
        width,
        height,
        rgba: img.to_rgba8().into_raw(),
    })
}
