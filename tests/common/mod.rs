#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

pub const CHROME_WINDOWS: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";
pub const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
pub const YANDEXBOT: &str = "Mozilla/5.0 (compatible; YandexBot/3.0; +http://yandex.com/bots)";

/// Format one combined-log line
pub fn log_line(ip: &str, time: &str, request: &str, status: u16, size: u64, referer: &str, agent: &str) -> String {
    format!(r#"{ip} - - [{time}] "{request}" {status} {size} "{referer}" "{agent}""#)
}

/// A small access log with a known shape:
/// - 6 lines, 5 valid, 1 malformed
/// - 2h 30m between first and last record
/// - total traffic 10_000 bytes
pub fn sample_log() -> String {
    [
        log_line("10.0.0.1", "10/Oct/2023:10:00:12 +0000", "GET /index.html HTTP/1.1", 200, 4000, "https://www.example.com/start", CHROME_WINDOWS),
        log_line("10.0.0.1", "10/Oct/2023:10:05:12 +0000", "GET /about HTTP/1.1", 200, 3000, "-", CHROME_WINDOWS),
        log_line("10.0.0.2", "10/Oct/2023:11:00:45 +0000", "GET /missing HTTP/1.1", 404, 500, "http://search.test:8080/q", FIREFOX_LINUX),
        "this line is not part of any log format".to_string(),
        log_line("66.249.66.1", "10/Oct/2023:12:00:00 +0000", "GET /robots.txt HTTP/1.1", 200, 1500, "-", GOOGLEBOT),
        log_line("10.0.0.3", "10/Oct/2023:12:30:30 +0000", "POST /api/login HTTP/1.1", 500, 1000, "", YANDEXBOT),
    ]
    .join("\n")
        + "\n"
}

/// Temporary directory holding one log file
pub struct LogFixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl LogFixture {
    pub fn new(contents: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("access.log");
        std::fs::write(&path, contents).expect("write log fixture");
        Self { dir, path }
    }

    pub fn sample() -> Self {
        Self::new(&sample_log())
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("utf-8 temp path")
    }
}
