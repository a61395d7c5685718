//! End-to-end tests of the highlight bridge with the real syntect engine.
//!
//! These load the bundled grammars and themes, so each test pays the full
//! engine construction cost once.

use simple_press::highlight::{ConfigurationError, HighlightBridge, HighlightConfig, HighlightError};
use simple_press::render::{DocumentRenderer, UnknownLanguagePolicy};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn ocean(langs: &[&str]) -> HighlightConfig {
    HighlightConfig::new(
        "base16-ocean.dark",
        ["base16-ocean.dark"],
        langs.iter().copied(),
    )
}

#[test]
fn rust_snippet_renders_colored_markup() {
    let mut renderer = DocumentRenderer::new(UnknownLanguagePolicy::Error);
    let bridge = HighlightBridge::initialize(ocean(&["rust", "bash"]), &mut renderer).unwrap();

    let markup = bridge.render("fn main() {}", "rust").unwrap();
    let html = markup.as_str();
    assert!(html.starts_with("<pre "));
    assert!(html.contains(r#"data-theme="base16-ocean.dark""#));
    assert!(html.contains(r#"<code class="language-rust">"#));
    assert!(html.contains("<span style=\"color:"));
    assert!(html.ends_with("</code></pre>"));
}

#[test]
fn unconfigured_language_is_an_error() {
    let mut renderer = DocumentRenderer::new(UnknownLanguagePolicy::Error);
    let bridge = HighlightBridge::initialize(ocean(&["rust", "bash"]), &mut renderer).unwrap();

    assert_eq!(
        bridge.render("fn main() {}", "python"),
        Err(HighlightError::UnknownLanguage("python".into()))
    );
}

#[test]
fn hook_is_registered_and_used_by_the_renderer() {
    let mut renderer = DocumentRenderer::new(UnknownLanguagePolicy::Plain);
    assert!(!renderer.has_code_highlighter());
    HighlightBridge::initialize(ocean(&["bash"]), &mut renderer).unwrap();
    assert!(renderer.has_code_highlighter());

    let doc = renderer
        .render_markdown("Run it:\n\n```bash\necho \"hi\" | wc -c\n```\n\n```text\nplain\n```\n")
        .unwrap();
    assert!(doc.html.contains(r#"data-lang="bash""#));
    assert_eq!(doc.blocks.highlighted, 1);
    assert_eq!(doc.blocks.fallbacks, 1);
}

#[test]
fn theme_outside_theme_set_registers_nothing() {
    let mut renderer = DocumentRenderer::new(UnknownLanguagePolicy::Error);
    let config = HighlightConfig::new("InspiredGitHub", ["base16-ocean.dark"], ["rust"]);

    let result = HighlightBridge::initialize(config, &mut renderer);
    assert!(matches!(
        result,
        Err(ConfigurationError::DefaultThemeNotEnabled(_))
    ));
    assert!(!renderer.has_code_highlighter());
}

#[test]
fn custom_theme_from_theme_dir() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("github-dark-high-contrast.tmTheme"),
        HIGH_CONTRAST_THEME,
    )
    .unwrap();
    let config = HighlightConfig::new(
        "github-dark-high-contrast",
        ["github-dark-high-contrast"],
        ["rust", "bash"],
    )
    .with_theme_dir(tmp.path());

    let mut renderer = DocumentRenderer::new(UnknownLanguagePolicy::Error);
    let bridge = HighlightBridge::initialize(config, &mut renderer).unwrap();
    let html = bridge.render("fn main() {}", "rust").unwrap().into_string();
    assert!(html.contains(r#"data-theme="github-dark-high-contrast""#));
    assert!(html.contains("background-color:#0a0c10"));
}

#[test]
fn editing_theme_file_changes_fingerprint() {
    let tmp = TempDir::new().unwrap();
    let theme_path = tmp.path().join("github-dark-high-contrast.tmTheme");
    let config = HighlightConfig::new(
        "github-dark-high-contrast",
        ["github-dark-high-contrast"],
        ["rust"],
    )
    .with_theme_dir(tmp.path());
    let mut renderer = DocumentRenderer::new(UnknownLanguagePolicy::Error);

    std::fs::write(&theme_path, HIGH_CONTRAST_THEME).unwrap();
    let before = HighlightBridge::initialize(config.clone(), &mut renderer).unwrap();
    std::fs::write(&theme_path, HIGH_CONTRAST_THEME.replace("#0a0c10", "#000000")).unwrap();
    let after = HighlightBridge::initialize(config, &mut renderer).unwrap();

    assert_ne!(before.fingerprint(), after.fingerprint());
    assert_ne!(
        before.render("fn main() {}", "rust").unwrap(),
        after.render("fn main() {}", "rust").unwrap()
    );
}

#[test]
fn concurrent_renders_agree() {
    let mut renderer = DocumentRenderer::new(UnknownLanguagePolicy::Error);
    let bridge = Arc::new(
        HighlightBridge::initialize(ocean(&["rust", "bash"]), &mut renderer).unwrap(),
    );
    let expected = bridge.render("let x = vec![1, 2, 3];", "rust").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || bridge.render("let x = vec![1, 2, 3];", "rust").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

/// A minimal dark theme: background, foreground and a keyword color.
const HIGH_CONTRAST_THEME: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>name</key>
    <string>GitHub Dark High Contrast</string>
    <key>settings</key>
    <array>
        <dict>
            <key>settings</key>
            <dict>
                <key>background</key>
                <string>#0a0c10</string>
                <key>foreground</key>
                <string>#f0f3f6</string>
            </dict>
        </dict>
        <dict>
            <key>name</key>
            <string>Keyword</string>
            <key>scope</key>
            <string>keyword, storage</string>
            <key>settings</key>
            <dict>
                <key>foreground</key>
                <string>#ff9492</string>
            </dict>
        </dict>
    </array>
</dict>
</plist>
"#;
