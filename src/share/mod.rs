//! Stateless share-link derivation. Nothing here feeds back into the data
//! model; everything is a deterministic transform of a poll id and title.

use reqwest::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePlatform {
    Facebook,
    Twitter,
    Linkedin,
    Whatsapp,
}

/// Canonical share link for a poll: `{origin}/poll/{id}`.
pub fn share_url(origin: &str, poll_id: &str) -> String {
    format!("{}/poll/{}", origin.trim_end_matches('/'), poll_id)
}

/// Social deep link that pre-fills a post pointing at the share URL.
pub fn social_share_url(platform: SharePlatform, title: &str, url: &str) -> String {
    let text = format!("Check out this poll: {title}");
    let link = match platform {
        SharePlatform::Facebook => Url::parse_with_params(
            "https://www.facebook.com/sharer/sharer.php",
            &[("u", url)],
        ),
        SharePlatform::Twitter => Url::parse_with_params(
            "https://twitter.com/intent/tweet",
            &[("text", text.as_str()), ("url", url)],
        ),
        SharePlatform::Linkedin => Url::parse_with_params(
            "https://www.linkedin.com/sharing/share-offsite/",
            &[("url", url)],
        ),
        SharePlatform::Whatsapp => Url::parse_with_params(
            "https://wa.me/",
            &[("text", format!("{text} {url}").as_str())],
        ),
    };
    link.expect("share base url is valid").to_string()
}
