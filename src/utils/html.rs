use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) are kept, dangerous tags (like
/// <script>, <iframe>) and malicious attributes (like onclick) are stripped.
///
/// Note: a <script> tag is removed together with its content. Question texts
/// and instructions go through here before they are stored, since the wizards
/// render them as HTML.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
