//! User-Agent string for stream transfers.

/// Default User-Agent for transfer requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("cadmium/{version}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_crate_version() {
        let ua = default_user_agent();
        assert_eq!(ua.strip_prefix("cadmium/"), Some(env!("CARGO_PKG_VERSION")));
    }
}
