//! Coarse device classification from the User-Agent header.
//!
//! Access log entries carry a short `"Desktop - Chrome"` style descriptor
//! rather than the raw User-Agent. The classification is intentionally
//! crude: platform bucket plus agent family, nothing more.

/// Derive a `"<platform> - <family>"` descriptor from a User-Agent value.
pub fn describe(user_agent: Option<&str>) -> String {
    let Some(ua) = user_agent else {
        return "Unknown".to_string();
    };

    let platform = if ua.contains("iPhone")
        || ua.contains("iPad")
        || ua.contains("Android")
        || ua.contains("Mobile")
    {
        "Mobile"
    } else {
        "Desktop"
    };

    // Order matters: Chrome UAs also contain "Safari", Edge UAs contain
    // "Chrome".
    let family = if ua.contains("Edg/") || ua.contains("Edge/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        "Unknown"
    };

    format!("{platform} - {family}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
        assert_eq!(describe(Some(ua)), "Desktop - Chrome");
    }

    #[test]
    fn test_mobile_safari() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) \
                  AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";
        assert_eq!(describe(Some(ua)), "Mobile - Safari");
    }

    #[test]
    fn test_edge_not_misread_as_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/120.0 Safari/537.36 Edg/120.0";
        assert_eq!(describe(Some(ua)), "Desktop - Edge");
    }

    #[test]
    fn test_missing_user_agent() {
        assert_eq!(describe(None), "Unknown");
    }
}
