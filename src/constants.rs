//! Shared constants for loading and plotting trials

use image::Rgb;

// =============================================================================
// DATA LAYOUT
// =============================================================================

/// Number of trial indices attempted by the batch loader
pub const N_TRIALS: usize = 80;

/// Default root of per-match data (`<data>/<match_id>/...`)
pub const DEFAULT_DATA_DIR: &str = "../data";
/// Default directory holding `<map_name>.json` problem files
pub const DEFAULT_MAPS_DIR: &str = "../map_creation/maps_v1";
/// Default output directory for saved figures
pub const DEFAULT_FIGURES_DIR: &str = "./figures";

/// Match metadata file inside a match directory
pub const METADATA_FILE: &str = "metadata.json";

/// Sentinel returned by `oracle_request_index` when the oracle was never called
pub const NO_ORACLE_REQUEST: i32 = -1;

/// Significance level for regression annotations
pub const SIGNIFICANCE_ALPHA: f64 = 0.05;

/// Font files probed when no font is configured
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

// =============================================================================
// COLORS
// =============================================================================

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const AXIS_COLOR: Rgb<u8> = Rgb([60, 60, 60]);
pub const TEXT_COLOR: Rgb<u8> = Rgb([20, 20, 20]);
pub const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
pub const PATH_COLOR: Rgb<u8> = Rgb([0x22, 0x22, 0x22]);
pub const ORACLE_MARKER: Rgb<u8> = Rgb([255, 215, 0]);
pub const COLLECT_MARKER: Rgb<u8> = Rgb([0, 128, 0]);
pub const HIST_BAR: Rgb<u8> = Rgb([31, 119, 180]);
pub const REGRESSION_LINE: Rgb<u8> = Rgb([220, 30, 30]);
pub const SCATTER_POINT: Rgb<u8> = Rgb([31, 119, 180]);
pub const ERROR_BAR: Rgb<u8> = Rgb([40, 40, 40]);

/// Node color for rewarded nodes under an unrecognized accuracy class
pub const DEFAULT_REWARD_COLOR: Rgb<u8> = Rgb([31, 119, 180]);

/// Rewarded-node color per oracle accuracy class
pub const OR_ACC_COLORS: &[(&str, Rgb<u8>)] = &[
    ("A", Rgb([44, 160, 44])),
    ("I", Rgb([214, 39, 40])),
];

/// Default bar palette (cycled when there are more groups than colors)
pub const BAR_PALETTE: &[Rgb<u8>] = &[
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
];

/// Look up the rewarded-node color for an oracle accuracy class
pub fn oracle_acc_color(acc: Option<&str>) -> Rgb<u8> {
    acc.and_then(|acc| {
        OR_ACC_COLORS
            .iter()
            .find(|(key, _)| *key == acc)
            .map(|(_, color)| *color)
    })
    .unwrap_or(DEFAULT_REWARD_COLOR)
}

// =============================================================================
// CONDITION ORDERS
// =============================================================================

/// Fixed category order for each condition variable used on bar chart axes
pub const COND_ORDERS: &[(&str, &[&str])] = &[
    ("cond_oracle_acc", &["I", "A"]),
    ("cond_best_strat", &["OF", "NO"]),
    ("cond_map_size", &["S", "L"]),
    ("cond_gap_size", &["S", "L"]),
    ("map_kind", &["random", "spatial"]),
    ("correct_strat", &["0", "1"]),
    ("retry_response", &["0", "1"]),
    ("oracle_requested", &["0", "1"]),
    ("ius_type", &["low", "high"]),
];

/// Category order for a condition variable, if it has one
pub fn cond_order(name: &str) -> Option<&'static [&'static str]> {
    COND_ORDERS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, order)| *order)
}

/// Upper y bound for a bar chart metric
pub fn metric_ymax(metric: &str) -> f64 {
    match metric {
        "performance" => 1.1,
        "oracle_requested" => 1.0,
        "n_moves" => 50.0,
        _ => 1.0,
    }
}
