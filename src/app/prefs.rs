// src/app/prefs.rs
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

impl crate::app::MarqueeApp {
    // ---- tiny flags ----
    pub(crate) fn mark_dirty(&mut self) {
        self.prefs_dirty = true;
    }

    pub(crate) fn maybe_save_prefs(&mut self) {
        // debounce a bit to avoid writing every frame
        if self.prefs_dirty && self.prefs_last_write.elapsed() >= Duration::from_millis(300) {
            self.save_prefs();
            self.prefs_dirty = false;
            self.prefs_last_write = Instant::now();
        }
    }

    // ---- load/save prefs ----
    pub(crate) fn load_prefs(&mut self) {
        let path = prefs_path();
        let Ok(txt) = fs::read_to_string(&path) else {
            return;
        };

        for line in txt.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((k, v)) = line.split_once('=') else {
                continue;
            };
            let k = k.trim();
            let v = v.trim();

            match k {
                "theme_dark" => self.theme_dark = matches!(v, "1" | "true" | "yes"),
                "poster_w" => {
                    if let Ok(n) = v.parse::<f32>() {
                        self.poster_width_ui = n.clamp(120.0, 220.0);
                    }
                }
                _ => {}
            }
        }
    }

    pub(crate) fn save_prefs(&self) {
        let path = prefs_path();
        let _ = fs::create_dir_all(path.parent().unwrap_or_else(|| std::path::Path::new(".")));

        let txt = format!(
            "# marquee ui prefs\n\
             theme_dark={}\n\
             poster_w={:.1}\n",
            if self.theme_dark { "1" } else { "0" },
            self.poster_width_ui,
        );

        let _ = fs::write(path, txt);
    }
}

pub fn prefs_path() -> PathBuf {
    crate::app::posters::cache_dir().join("ui_prefs.txt")
}
