//! Browser binary discovery.

use browserd_core::BrowserKind;

/// Locate an executable for the requested browser. Absolute candidates are
/// checked on disk; bare names are resolved through `PATH`.
pub fn find_browser_binary(kind: BrowserKind) -> Option<String> {
    let candidates: Vec<&str> = match kind {
        BrowserKind::Chromium => {
            if cfg!(target_os = "macos") {
                vec![
                    "/Applications/Chromium.app/Contents/MacOS/Chromium",
                    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                ]
            } else if cfg!(target_os = "linux") {
                vec![
                    "chromium",
                    "chromium-browser",
                    "google-chrome",
                    "google-chrome-stable",
                    "/usr/bin/chromium",
                    "/usr/bin/chromium-browser",
                ]
            } else {
                vec![
                    r"C:\Program Files\Chromium\Application\chrome.exe",
                    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                ]
            }
        }
        BrowserKind::Chrome => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"]
            } else if cfg!(target_os = "linux") {
                vec![
                    "google-chrome",
                    "google-chrome-stable",
                    "/usr/bin/google-chrome",
                ]
            } else {
                vec![
                    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                ]
            }
        }
        BrowserKind::Edge => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"]
            } else if cfg!(target_os = "linux") {
                vec![
                    "microsoft-edge",
                    "microsoft-edge-stable",
                    "/usr/bin/microsoft-edge",
                ]
            } else {
                vec![
                    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
                    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
                ]
            }
        }
    };

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
        if !candidate.contains('/') && !candidate.contains('\\') {
            if let Ok(path) = which::which(candidate) {
                return Some(path.to_string_lossy().into_owned());
            }
        }
    }
    None
}
