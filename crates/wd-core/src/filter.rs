/// Extensions that never carry reviewable source: images, archives, binary
/// documents, media, fonts, build artifacts, lockfiles.
const EXCLUDED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg", "zip", "tar", "gz", "tgz", "bz2",
    "xz", "rar", "7z", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "mp3", "mp4", "avi",
    "mov", "wav", "woff", "woff2", "ttf", "eot", "otf", "exe", "dll", "so", "dylib", "bin",
    "class", "pyc", "wasm", "lock", "min.js", "min.css",
];

/// Directory segments that mark generated, vendored, or VCS-internal trees.
const EXCLUDED_SEGMENTS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "dist",
    "build",
    "out",
    "__pycache__",
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    ".gradle",
    "coverage",
];

/// Whether a changed file should be sent for analysis. Runs before fan-out:
/// ineligible files never reach the capability and never count toward a
/// task's file totals. Files without an extension are eligible unless a path
/// segment excludes them.
pub fn is_eligible(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();

    if lower
        .split('/')
        .any(|segment| EXCLUDED_SEGMENTS.contains(&segment))
    {
        return false;
    }

    let file_name = lower.rsplit('/').next().unwrap_or(&lower);
    !EXCLUDED_EXTENSIONS
        .iter()
        .any(|ext| file_name.ends_with(&format!(".{ext}")))
}
