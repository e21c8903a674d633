//! `pagezip presets` – example pages to try.

pub const PRESET_URLS: [&str; 3] = [
    "https://www.bmw.com/en/index.html",
    "https://www.ferrari.com/en-EN",
    "https://streamlit.io/",
];

pub fn run_presets() {
    for url in PRESET_URLS {
        println!("{url}");
    }
}
