use std::sync::OnceLock;

static HOSTNAME: OnceLock<String> = OnceLock::new();

/// Host name of the machine running the pipeline, `"unknown"` if unavailable.
pub fn hostname() -> &'static str {
    HOSTNAME.get_or_init(|| {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

/// Get platform (OS family).
#[inline]
pub fn platform() -> &'static str {
    std::env::consts::OS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_stable() {
        assert_eq!(hostname(), hostname());
        assert!(!hostname().is_empty());
    }

    #[test]
    fn platform_is_known() {
        assert!(!platform().is_empty());
    }
}
