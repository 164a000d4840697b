//! Logical channel naming.
//!
//! Channels are locale-scoped broadcast topics with no persisted history.
//! The name derives deterministically from the locale so that producers,
//! sessions, and clients agree on routing without coordination.

use domain::Locale;

pub const ARTICLE_UPDATES_PREFIX: &str = "article-updates-";

/// Channel carrying article publish/update events for one locale.
pub fn article_updates(locale: Locale) -> String {
    format!("{ARTICLE_UPDATES_PREFIX}{locale}")
}

/// Parse an `article-updates-<locale>` channel name back into its locale.
///
/// Returns `None` for names outside the article-updates namespace or with an
/// unknown locale code.
pub fn parse_article_updates(channel: &str) -> Option<Locale> {
    channel
        .strip_prefix(ARTICLE_UPDATES_PREFIX)?
        .parse::<Locale>()
        .ok()
}
