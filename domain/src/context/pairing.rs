//! Declaration/definition pairing.

const DECLARATION_EXTS: &[&str] = &["h", "hpp", "hh", "hxx"];
const IMPLEMENTATION_EXTS: &[&str] = &["cpp", "cc", "cxx", "c"];

fn split_ext(path: &str) -> Option<(&str, &str)> {
    let dot = path.rfind('.')?;
    if path[dot..].contains('/') {
        return None;
    }
    Some((&path[..dot], &path[dot + 1..]))
}

enum Counterpart {
    /// Insert the declaration before this file.
    Before(String),
    /// Insert the implementation after this file.
    After(String),
}

fn first_existing(stem: &str, exts: &[&str], exists: &impl Fn(&str) -> bool) -> Option<String> {
    exts.iter()
        .map(|e| format!("{stem}.{e}"))
        .find(|candidate| exists(candidate.as_str()))
}

fn counterpart(path: &str, exists: &impl Fn(&str) -> bool) -> Option<Counterpart> {
    let (stem, ext) = split_ext(path)?;
    let ext = ext.to_lowercase();
    if IMPLEMENTATION_EXTS.contains(&ext.as_str()) {
        first_existing(stem, DECLARATION_EXTS, exists).map(Counterpart::Before)
    } else if DECLARATION_EXTS.contains(&ext.as_str()) {
        first_existing(stem, IMPLEMENTATION_EXTS, exists).map(Counterpart::After)
    } else {
        None
    }
}

/// Insert each file's existing counterpart next to it: declarations
/// immediately before their implementation, implementations immediately
/// after their declaration. Files already present are never duplicated.
pub fn pair_counterparts(files: &[String], exists: impl Fn(&str) -> bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(files.len());
    for file in files {
        if out.contains(file) {
            continue;
        }
        match counterpart(file, &exists) {
            Some(Counterpart::Before(decl)) if !out.contains(&decl) && !files.contains(&decl) => {
                out.push(decl);
                out.push(file.clone());
            }
            Some(Counterpart::After(imp)) if !out.contains(&imp) && !files.contains(&imp) => {
                out.push(file.clone());
                out.push(imp);
            }
            _ => out.push(file.clone()),
        }
    }
    out
}
