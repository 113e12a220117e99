use std::path::Path;

use ratchet_core::history::{encode_history, load_history};
use ratchet_core::types::History;

use super::Workspace;

/// Width of the fingerprint prefix shown in the table.
const FINGERPRINT_PREFIX: usize = 12;

/// Run `ratchet history` -- show what the last successful check recorded.
pub fn run(config: Option<&Path>, history_file: Option<&str>, json: bool) -> i32 {
    let ws = match Workspace::open("history", config, history_file) {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let path = ws.history_path();
    let history = match load_history(&path) {
        Ok(Some(h)) => h,
        Ok(None) => {
            eprintln!("ratchet history: no history recorded at {}", path.display());
            return 0;
        }
        Err(e) => {
            eprintln!("ratchet history: {}", e);
            return 2;
        }
    };

    if json {
        match encode_history(&history) {
            Ok(doc) => print!("{}", doc),
            Err(e) => {
                eprintln!("ratchet history: {}", e);
                return 2;
            }
        }
    } else {
        print!("{}", render_table(&history));
    }
    0
}

fn render_table(history: &History) -> String {
    let mut out = String::new();
    for (path, entry) in history {
        let fp: String = entry.fingerprint.chars().take(FINGERPRINT_PREFIX).collect();
        let fp = if fp.is_empty() { "-".to_string() } else { fp };
        out.push_str(&format!(
            "{:>6}  {:<width$}  {}\n",
            entry.count(),
            fp,
            path,
            width = FINGERPRINT_PREFIX
        ));
    }
    out.push_str(&format!(
        "{} file(s), {} violation(s)\n",
        history.len(),
        history.total_violations()
    ));
    out
}
