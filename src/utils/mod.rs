/// Characters that may not appear in a file name on common filesystems
const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Longest file name written, in bytes; most filesystems stop at 255
pub const MAX_FILENAME_BYTES: usize = 250;

/// Cut `text` to at most `max_bytes` bytes without splitting a character
pub fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Build `<stem><extension>` within [`MAX_FILENAME_BYTES`], shortening the end of the stem
pub fn fit_filename(stem: &str, extension: &str) -> String {
    let budget = MAX_FILENAME_BYTES.saturating_sub(extension.len());
    format!("{}{}", truncate_utf8(stem, budget).trim_end(), extension)
}

/// Normalize a spoken-language answer; blank means "detect automatically"
pub fn normalize_language_code(lang: &str) -> Option<String> {
    let normalized = lang.trim().replace('-', "_").to_lowercase();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str, whisper_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path, "--version").await {
        missing.push(format!("{} - required to download videos without captions", yt_dlp_path));
    }

    if !check_command_available(whisper_path, "--help").await {
        missing.push(format!("{} - required for speech-to-text fallback", whisper_path));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str, check_arg: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg(check_arg)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("1. Intro - ChannelA.md"), "1. Intro - ChannelA.md");
        assert_eq!(sanitize_filename("What? A/B: \"test\" <1> | *"), "What AB test 1");
        assert_eq!(sanitize_filename("  spaced  "), "spaced");
        assert_eq!(sanitize_filename("C:\\dir\\file"), "Cdirfile");
    }

    #[test]
    fn test_sanitize_removes_every_illegal_character() {
        let all = "<>:\"/\\|?*";
        for (i, c) in all.chars().enumerate() {
            let input = format!("a{}b{}", c, &all[..i]);
            let cleaned = sanitize_filename(&input);
            assert!(
                !cleaned.chars().any(|ch| ILLEGAL_FILENAME_CHARS.contains(&ch)),
                "{input:?} -> {cleaned:?}"
            );
            assert!(cleaned.starts_with("ab"));
        }
        assert_eq!(sanitize_filename(all), "");
    }

    #[test]
    fn test_truncate_utf8_respects_char_boundaries() {
        assert_eq!(truncate_utf8("short", 10), "short");
        assert_eq!(truncate_utf8("日本語", 7), "日本");
        assert_eq!(truncate_utf8("日本語", 2), "");
    }

    #[test]
    fn test_fit_filename_keeps_prefix_and_extension() {
        let stem = format!("12. {} - チャンネル", "日".repeat(120));
        let name = fit_filename(&stem, ".md");

        assert!(name.len() <= MAX_FILENAME_BYTES);
        assert!(name.starts_with("12. 日日"));
        assert!(name.ends_with(".md"));
        assert_eq!(fit_filename("1. Intro - ChannelA", ".md"), "1. Intro - ChannelA.md");
    }

    #[test]
    fn test_normalize_language_code() {
        assert_eq!(normalize_language_code("pt"), Some("pt".to_string()));
        assert_eq!(normalize_language_code(" PT-BR "), Some("pt_br".to_string()));
        assert_eq!(normalize_language_code("   "), None);
        assert_eq!(normalize_language_code(""), None);
    }

    #[test]
    fn test_check_dependencies_reports_missing_tools() {
        let missing = tokio_test::block_on(check_dependencies(
            "no-such-yt-dlp-binary",
            "no-such-whisper-binary",
        ));
        assert_eq!(missing.len(), 2);
        assert!(missing[0].starts_with("no-such-yt-dlp-binary"));
    }
}
