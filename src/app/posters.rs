// src/app/posters.rs — on-disk poster cache plus a small download pool.
// Files are keyed by md5(url); textures are uploaded lazily on the UI
// thread under a per-frame budget.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, SystemTime};

use eframe::egui::{self as eg, ColorImage, TextureHandle};
use reqwest::blocking::Client;
use tracing::warn;

use crate::config::{load_config, resolve_relative_path};

const POSTER_WORKERS: usize = 8;
const MAX_DONE_PER_FRAME: usize = 12;
pub const MAX_UPLOADS_PER_FRAME: usize = 4;

const POSTER_RETENTION_DAYS: u64 = 30;
const POSTER_RETENTION_SECS: u64 = POSTER_RETENTION_DAYS * 24 * 60 * 60;

static CACHE_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();
static POSTER_DIR_ONCE: OnceLock<PathBuf> = OnceLock::new();

pub fn cache_dir() -> PathBuf {
    CACHE_DIR_ONCE
        .get_or_init(|| {
            let cfg = load_config();
            let path = cfg
                .cache_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| resolve_relative_path(".marquee_cache"));
            if let Err(e) = fs::create_dir_all(&path) {
                warn!("failed to create cache dir {}: {e}", path.display());
            }
            path
        })
        .clone()
}

fn poster_cache_dir() -> PathBuf {
    POSTER_DIR_ONCE
        .get_or_init(|| {
            let path = cache_dir().join("posters");
            if let Err(e) = fs::create_dir_all(&path) {
                warn!("failed to create poster cache dir {}: {e}", path.display());
                return cache_dir();
            }
            if let Err(e) = prune_poster_cache(&path) {
                warn!("poster cache prune failed: {e}");
            }
            path
        })
        .clone()
}

fn prune_poster_cache(dir: &Path) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(POSTER_RETENTION_SECS))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let modified = entry
            .metadata()?
            .modified()
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if modified < cutoff {
            let _ = fs::remove_file(entry.path());
            removed += 1;
        }
    }
    Ok(removed)
}

pub fn url_to_cache_key(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

fn cached_poster_path(key: &str) -> Option<PathBuf> {
    let p = poster_cache_dir().join(format!("{key}.jpg"));
    p.exists().then_some(p)
}

/// Download, decode, re-encode as JPEG and store under the key. Writes to a
/// `.part` file then renames so a crashed download never leaves a
/// half-written poster behind.
fn download_and_store(client: &Client, url: &str, key: &str) -> Result<PathBuf, String> {
    let dest = poster_cache_dir().join(format!("{key}.jpg"));
    if dest.exists() {
        return Ok(dest);
    }

    let bytes = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .map_err(|e| format!("download {url}: {e}"))?;

    let img = image::load_from_memory(&bytes).map_err(|e| format!("decode {url}: {e}"))?;

    // JPEG has no alpha; flatten before encoding
    let rgb = img.to_rgb8();
    let mut jpeg_bytes: Vec<u8> = Vec::new();
    {
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, 85);
        encoder
            .encode_image(&rgb)
            .map_err(|e| format!("encode jpeg: {e}"))?;
    }

    let tmp = dest.with_extension("jpg.part");
    {
        let mut f = fs::File::create(&tmp).map_err(|e| format!("create tmp: {e}"))?;
        f.write_all(&jpeg_bytes).map_err(|e| format!("write: {e}"))?;
    }
    fs::rename(&tmp, &dest).map_err(|e| format!("rename: {e}"))?;
    Ok(dest)
}

fn load_color_image(path: &Path) -> Result<ColorImage, String> {
    let img = image::ImageReader::open(path)
        .map_err(|e| format!("open {}: {e}", path.display()))?
        .with_guessed_format()
        .map_err(|e| format!("guess format {}: {e}", path.display()))?
        .decode()
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, &rgba))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Pending, // queued or downloading
    Cached,  // on disk, awaiting texture upload
    Ready,
    Failed,
}

struct PosterJob {
    key: String,
    url: String,
}

struct PosterDone {
    key: String,
    result: Result<PathBuf, String>,
}

/// Worker-pool poster loader. One per app; the grid asks it for textures
/// and it schedules whatever is missing.
pub struct PosterLoader {
    states: HashMap<String, SlotState>,
    textures: HashMap<String, TextureHandle>,
    work_tx: Sender<PosterJob>,
    done_rx: Receiver<PosterDone>,
}

impl PosterLoader {
    pub fn new() -> Self {
        let (work_tx, work_rx) = mpsc::channel::<PosterJob>();
        let (done_tx, done_rx) = mpsc::channel::<PosterDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        // One shared client for the pool (keep-alive + pooling).
        let client = Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(POSTER_WORKERS)
            .build();

        match client {
            Ok(client) => {
                let client = Arc::new(client);
                for _ in 0..POSTER_WORKERS {
                    let work_rx = Arc::clone(&work_rx);
                    let done_tx = done_tx.clone();
                    let client = Arc::clone(&client);
                    std::thread::spawn(move || loop {
                        let job = {
                            let rx = match work_rx.lock() {
                                Ok(rx) => rx,
                                Err(_) => break,
                            };
                            rx.recv()
                        };
                        let Ok(PosterJob { key, url }) = job else {
                            break;
                        };
                        let result = download_and_store(&client, &url, &key);
                        let _ = done_tx.send(PosterDone { key, result });
                    });
                }
            }
            Err(e) => {
                // No pool: every slot will fail over to the placeholder.
                warn!("poster http client build failed: {e}");
            }
        }

        Self {
            states: HashMap::new(),
            textures: HashMap::new(),
            work_tx,
            done_rx,
        }
    }

    /// Drain completed downloads (bounded per frame).
    pub fn poll(&mut self) {
        for _ in 0..MAX_DONE_PER_FRAME {
            match self.done_rx.try_recv() {
                Ok(PosterDone { key, result }) => {
                    let state = match result {
                        Ok(_) => SlotState::Cached,
                        Err(e) => {
                            warn!("poster fetch failed: {e}");
                            SlotState::Failed
                        }
                    };
                    self.states.insert(key, state);
                }
                Err(mpsc::TryRecvError::Empty) | Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Texture for a poster URL, scheduling download / upload as needed.
    /// `uploads_left` bounds GPU uploads per frame; None paints the
    /// placeholder card.
    pub fn texture(
        &mut self,
        ctx: &eg::Context,
        url: &str,
        uploads_left: &mut usize,
    ) -> Option<TextureHandle> {
        let key = url_to_cache_key(url);

        match self.states.get(&key).copied() {
            Some(SlotState::Ready) => return self.textures.get(&key).cloned(),
            Some(SlotState::Pending) | Some(SlotState::Failed) => return None,
            Some(SlotState::Cached) => {
                if *uploads_left == 0 {
                    return None;
                }
                let path = poster_cache_dir().join(format!("{key}.jpg"));
                match load_color_image(&path) {
                    Ok(img) => {
                        *uploads_left -= 1;
                        let tex = ctx.load_texture(key.clone(), img, eg::TextureOptions::LINEAR);
                        self.textures.insert(key.clone(), tex.clone());
                        self.states.insert(key, SlotState::Ready);
                        return Some(tex);
                    }
                    Err(e) => {
                        warn!("poster upload failed: {e}");
                        self.states.insert(key, SlotState::Failed);
                        return None;
                    }
                }
            }
            None => {}
        }

        // First sighting: reuse a cached file when present, else enqueue.
        if cached_poster_path(&key).is_some() {
            self.states.insert(key, SlotState::Cached);
        } else {
            self.states.insert(key.clone(), SlotState::Pending);
            let _ = self.work_tx.send(PosterJob {
                key,
                url: url.to_string(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::url_to_cache_key;

    #[test]
    fn cache_key_is_stable_md5_hex() {
        let k = url_to_cache_key("https://image.tmdb.org/t/p/w342/abc.jpg");
        assert_eq!(k.len(), 32);
        assert!(k.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(k, url_to_cache_key("https://image.tmdb.org/t/p/w342/abc.jpg"));
        assert_ne!(k, url_to_cache_key("https://image.tmdb.org/t/p/w342/def.jpg"));
    }
}
