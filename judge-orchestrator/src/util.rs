use crate::prelude::*;

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<String> {
    info!(
        "loading file {}",
        path.as_ref().to_str().unwrap_or("[non UTF-8 path]")
    );
    std::fs::read_to_string(path).map_err(Error::IOError)
}

pub fn enumerate_testcase<P: AsRef<Path>>(dir: P) -> Result<Vec<(PathBuf, PathBuf)>> {
    let dir_log = dir.as_ref().display();
    info!("enumerating testcases from {}", dir_log);

    let mut r = std::fs::read_dir(&dir)
        .map_err(Error::IOError)?
        .filter_map(|x| {
            let x = match x {
                Err(e) => {
                    warn!("error listing {}: {}", dir_log, e);
                    return None;
                }
                Ok(x) => x,
            };
            let p = x.path();
            let name = x.file_name();
            let name = match name.to_str() {
                None => {
                    warn!("skip non-UTF8 file name {} in {}", p.display(), dir_log);
                    return None;
                }
                Some(n) => n,
            };
            name.strip_suffix(".in").map(|x| {
                let outname = x.to_owned() + ".out";
                let dir = dir.as_ref().to_path_buf();
                (x.to_owned(), p, dir.join(outname))
            })
        })
        .collect::<Vec<_>>();
    // Case order must be deterministic (spec.md §4.9: "lexicographic
    // order by case name") since it drives max_time/max_memory
    // aggregation reproducibly across reruns.
    r.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(r.into_iter().map(|(_, inp, outp)| (inp, outp)).collect())
}

pub fn ensure_utf8_path<'a, P: AsRef<Path> + 'a>(p: &'a P) -> Result<&'a str> {
    match p.as_ref().to_str() {
        Some(x) => Ok(x),
        None => Err(Error::BadPathEncoding(p.as_ref().to_path_buf())),
    }
}

/// Read `path` (treating a missing file as empty, since a clean run
/// leaves e.g. `re.txt` or `ce.txt` unwritten), then apply the feedback
/// size cap: truncate to 32767 bytes with a trailing `...` marker, and
/// replace non-ASCII bytes with `?` so the result is always safe to
/// hand to a feedback channel that expects plain text.
pub fn clamp_feedback<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let content = read_or_empty(path.as_ref())?;
    Ok(clamp(content))
}

/// Like [`clamp_feedback`], but appends `label` and a second file's
/// content before truncating — used for the compare-output addendum a
/// `WA` verdict appends to the judge log.
pub fn combined_feedback<P: AsRef<Path>, Q: AsRef<Path>>(
    log_path: P,
    label: &str,
    extra_path: Q,
) -> Result<Vec<u8>> {
    let mut content = read_or_empty(log_path.as_ref())?;
    content.extend_from_slice(label.as_bytes());
    content.extend(read_or_empty(extra_path.as_ref())?);
    Ok(clamp(content))
}

fn read_or_empty(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(c) => Ok(c),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::IOError(e)),
    }
}

fn clamp(mut content: Vec<u8>) -> Vec<u8> {
    const LIMIT: usize = 32767;
    if content.len() > LIMIT {
        content.truncate(LIMIT - 3);
        content.extend_from_slice(b"...");
    }
    for b in &mut content {
        if !b.is_ascii() {
            *b = b'?';
        }
    }
    content
}
