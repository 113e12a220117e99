use std::path::{Path, PathBuf};

use ratchet_discover::{discover, DiscoverOptions};

use super::Workspace;

/// Run `ratchet files` -- print the files `check` would lint, one per line.
pub fn run(config: Option<&Path>, paths: Vec<PathBuf>, skip_files_like: Option<String>) -> i32 {
    let mut ws = match Workspace::open("files", config, None) {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    if skip_files_like.is_some() {
        ws.config.skip_files_like = skip_files_like;
    }
    let opts = match DiscoverOptions::from_config(&ws.config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("ratchet files: {}", e);
            return 2;
        }
    };
    let roots = ws.roots(paths);
    match discover(&roots, &opts) {
        Ok(found) => {
            for path in found {
                println!("{}", ws.relative(path).display());
            }
            0
        }
        Err(e) => {
            eprintln!("ratchet files: {}", e);
            2
        }
    }
}
