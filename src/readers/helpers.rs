// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_.

use crate::common::{
    FPath,
    FileSz,
};

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

/// Return the file name portion of an `FPath`.
pub fn basename(path: &FPath) -> FPath {
    match std::path::Path::new(path).file_name() {
        Some(name) => (*(name.to_string_lossy())).to_string(),
        None => FPath::default(),
    }
}

/// Join a directory `FPath` and a file name into one `FPath`.
pub fn fpath_join(
    dir: &str,
    name: &str,
) -> FPath {
    let joined: std::path::PathBuf = std::path::Path::new(dir).join(name);

    (*(joined.to_string_lossy())).to_string()
}

/// Return the size of the file, `None` if it cannot be stat'd.
pub fn path_filesz(path: &FPath) -> Option<FileSz> {
    defñ!("({:?})", path);
    let metadata = match std::fs::metadata(path) {
        Ok(val) => val,
        Err(_err) => {
            return None;
        }
    };

    Some(metadata.len())
}
