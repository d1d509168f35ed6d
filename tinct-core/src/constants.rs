//! Constants module for centralized tuning values
//!
//! [`crate::config::ThemingConfig`] falls back to these when a setting is not
//! overridden.

pub mod sampler {
    /// Central window sampled on each axis, as a fraction of the image.
    pub const WINDOW_START: u32 = 12;
    pub const WINDOW_END: u32 = 88;
    /// Sample every Nth pixel on both axes.
    pub const STEP: usize = 2;

    pub const MIN_ALPHA: u8 = 16;
    pub const DARK_LUMINANCE: f64 = 0.12;
    pub const BRIGHT_LUMINANCE: f64 = 0.82;
    pub const MIN_SATURATION: f64 = 0.18;

    pub const SKIN_HUE_MIN: f64 = 15.0;
    pub const SKIN_HUE_MAX: f64 = 45.0;
    pub const SKIN_SATURATION_MIN: f64 = 0.20;
    pub const SKIN_SATURATION_MAX: f64 = 0.60;
    pub const SKIN_LUMINANCE_MIN: f64 = 0.30;
    pub const SKIN_LUMINANCE_MAX: f64 = 0.85;

    /// A histogram peak below `max(MIN_PEAK, considered / PEAK_DIVISOR)` is
    /// treated as noise.
    pub const MIN_PEAK: u32 = 6;
    pub const PEAK_DIVISOR: u32 = 200;

    pub const MOSTLY_BRIGHT_RATIO: f64 = 0.5;
    pub const MIN_COLORFUL_RATIO: f64 = 0.04;

    /// Returned for bright images with nothing colorful in them.
    pub const NEUTRAL_LIGHT: tinct_model::Rgb =
        tinct_model::Rgb::new(200, 200, 204);
    /// Returned when no pixel survives filtering.
    pub const NEUTRAL_DARK: tinct_model::Rgb =
        tinct_model::Rgb::new(40, 40, 46);
}

pub mod synth {
    pub const DESATURATE: f64 = 0.20;
    pub const LUMINANCE_CEILING: f64 = 0.75;
    pub const MAX_CLAMP_DARKEN: f64 = 0.85;
    pub const FOCUS_LIGHT_THRESHOLD: f64 = 0.65;

    pub const OVERLAY_MID_DARKEN: f64 = 0.45;
    pub const OVERLAY_BOT_DARKEN: f64 = 0.75;
    pub const TEXT_MIX: f64 = 0.25;
    pub const TEXT_SECONDARY_MIX: f64 = 0.45;
    pub const TEXT_DETAIL_DARKEN: f64 = 0.35;

    pub const SUCCESS_BASE: tinct_model::Rgb =
        tinct_model::Rgb::new(46, 204, 113);
    pub const SUCCESS_MIX: f64 = 0.70;
}

pub mod transition {
    pub const STEPS: u32 = 9;
    pub const DURATION_MS: u64 = 180;
    /// Palettes closer than this on every probe field are applied without
    /// animating.
    pub const SKIP_DISTANCE: f64 = 6.0;
}

pub mod reactor {
    pub const POLL_INTERVAL_MS: u64 = 500;
    pub const DEBOUNCE_MS: u64 = 200;
}

pub mod cache {
    pub const RAM_CAPACITY: usize = 512;
    pub const DISK_SAVE_DEBOUNCE_MS: u64 = 45_000;
    pub const FILE_NAME: &str = "dynamic-colors-v3.json";
}

pub mod artwork {
    pub const MIN_DIMENSION: u32 = 64;
    pub const MAX_DECODE_DIMENSION: u32 = 400;

    pub const STATIC_EXTENSIONS: &[&str] =
        &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];
    pub const VIDEO_EXTENSIONS: &[&str] = &[
        "mp4", "m4v", "mkv", "webm", "avi", "mov", "wmv", "flv", "mpg", "mpeg",
    ];
}

pub mod precache {
    pub const BATCH_SIZE: usize = 200;
    pub const ITEM_DELAY_MS: u64 = 350;
    pub const IDLE_POLL_MS: u64 = 2_000;
}
