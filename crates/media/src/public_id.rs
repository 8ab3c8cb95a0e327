use std::sync::LazyLock;

use regex::Regex;

/// `.../upload/[v<digits>/]<public_id>.<extension>`
static UPLOAD_URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/upload/(?:v\d+/)?(.+)\.[A-Za-z0-9]+$").ok());

/// Recover the public id from a hosted asset URL.
///
/// Returns `None` for URLs that do not follow the upload layout; that is an
/// expected outcome for foreign or malformed URLs, not an error.
pub fn extract_public_id(url: &str) -> Option<String> {
    let re = UPLOAD_URL.as_ref()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("https://host/upload/v123/abc/def.webp", Some("abc/def"))]
    #[case(
        "https://res.cloudinary.com/demo/image/upload/v1719304854/blog-images/hero.webp",
        Some("blog-images/hero")
    )]
    #[case("https://res.cloudinary.com/demo/image/upload/sample.jpg", Some("sample"))]
    #[case(
        "https://res.cloudinary.com/demo/image/upload/ad-defaults/default-ad-my-campaign-.png",
        Some("ad-defaults/default-ad-my-campaign-")
    )]
    #[case("not-a-matching-url", None)]
    #[case("https://host/upload/v123/no-extension", None)]
    #[case("https://example.com/images/photo.jpg", None)]
    #[case("", None)]
    fn extracts_public_id(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_public_id(url).as_deref(), expected);
    }

    #[test]
    fn version_segment_requires_digits() {
        // "vx" is not a version, so it stays part of the id
        assert_eq!(
            extract_public_id("https://host/upload/vx/abc.png").as_deref(),
            Some("vx/abc")
        );
    }
}
