use std::fs;
use std::path::Path;

use dialoguer::Confirm;

use super::Workspace;

/// Run `ratchet reset` -- delete the history file so the next check starts over.
pub fn run(config: Option<&Path>, history_file: Option<&str>, yes: bool) -> i32 {
    let ws = match Workspace::open("reset", config, history_file) {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let path = ws.history_path();
    if !path.exists() {
        eprintln!("ratchet reset: no history at {} -- nothing to remove", path.display());
        return 0;
    }

    if !yes {
        let prompt = format!(
            "Delete {}? The next check will baseline every file again",
            path.display()
        );
        match Confirm::new().with_prompt(prompt).default(false).interact() {
            Ok(true) => {}
            Ok(false) => {
                eprintln!("cancelled");
                return 0;
            }
            Err(e) => {
                eprintln!("ratchet reset: cannot prompt ({}); pass --yes to confirm", e);
                return 2;
            }
        }
    }

    match fs::remove_file(&path) {
        Ok(()) => {
            eprintln!("ratchet reset: removed {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("ratchet reset: failed to remove {}: {}", path.display(), e);
            2
        }
    }
}
