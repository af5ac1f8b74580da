mod connection;
mod migrations;
mod trips;

pub use connection::Database;

#[cfg(test)]
pub(crate) fn temp_db_path(tag: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT: AtomicU64 = AtomicU64::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("tripmeter-{tag}-{}-{n}.sqlite3", std::process::id()))
}
