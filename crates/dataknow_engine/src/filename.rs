use sha2::{Digest, Sha256};

/// Filesystem-safe, deterministic name for an artifact:
/// `{sanitized_stem}--{short_hash(artifact)}.{ext}`.
pub fn artifact_filename(artifact: &str) -> String {
    let last_segment = artifact
        .split(['?', '#'])
        .next()
        .unwrap_or(artifact)
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let (stem, ext) = match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, sanitize_extension(ext)),
        _ => (last_segment, None),
    };
    let ext = ext.unwrap_or_else(|| "bin".to_string());
    format!("{}--{}.{}", sanitize_stem(stem), short_hash(artifact), ext)
}

fn sanitize_extension(ext: &str) -> Option<String> {
    let cleaned: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut cleaned = compacted.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "artifact".to_string();
    }
    if cleaned.chars().count() > 80 {
        cleaned = cleaned.chars().take(80).collect();
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '%' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().take(4).map(|byte| format!("{byte:02x}")).collect()
}
