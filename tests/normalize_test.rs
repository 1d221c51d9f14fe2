use spytcli::matching::{cache_key, collapse_whitespace, normalize, strip_noise};
use spytcli::types::SourceTrack;

#[test]
fn test_normalize_plain_track() {
    let track = SourceTrack::new("Daft Punk", "Get Lucky", "sp1");
    let queries = normalize(&track);

    // Nothing to strip, so there is no fallback query
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].text, "Daft Punk Get Lucky");
    assert_eq!(queries[0].artist, "Daft Punk");
}

#[test]
fn test_normalize_adds_stripped_fallback() {
    let track = SourceTrack::new("The Beatles", "Let It Be - Remastered 2009", "sp2");
    let queries = normalize(&track);

    assert_eq!(queries.len(), 2);
    // Primary query keeps the title, punctuation-only tokens dropped
    assert_eq!(queries[0].text, "The Beatles Let It Be Remastered 2009");
    assert_eq!(queries[1].text, "The Beatles Let It Be");
}

#[test]
fn test_normalize_bracketed_feature() {
    let track = SourceTrack::new("Mark Ronson", "Uptown Funk (feat. Bruno Mars)", "sp3");
    let queries = normalize(&track);

    assert_eq!(queries.last().unwrap().text, "Mark Ronson Uptown Funk");
}

#[test]
fn test_normalize_collapses_whitespace() {
    let track = SourceTrack::new("  Massive   Attack ", "\tTeardrop  ", "sp4");
    let queries = normalize(&track);

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].text, "Massive Attack Teardrop");
}

#[test]
fn test_normalize_preserves_case() {
    let track = SourceTrack::new("MGMT", "Kids", "sp5");
    assert_eq!(normalize(&track)[0].text, "MGMT Kids");
}

#[test]
fn test_normalize_empty_metadata() {
    let track = SourceTrack::new("  ", "", "sp6");
    assert!(normalize(&track).is_empty());
}

#[test]
fn test_normalize_title_only() {
    let track = SourceTrack::new("", "Clair de Lune", "sp7");
    let queries = normalize(&track);

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].text, "Clair de Lune");
}

#[test]
fn test_normalize_punctuation_only_name() {
    // Band names made only of punctuation are still searched
    let track = SourceTrack::new("!!!", "...", "sp8");
    let queries = normalize(&track);

    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].text, "!!! ...");
}

#[test]
fn test_strip_noise() {
    assert_eq!(strip_noise("Song (Live at Wembley)"), "Song");
    assert_eq!(strip_noise("Song [Remastered]"), "Song");
    assert_eq!(strip_noise("Song - Radio Edit"), "Song");
    assert_eq!(strip_noise("Song feat. Someone"), "Song");
    // Plain brackets are not noise
    assert_eq!(strip_noise("Song (Part 2)"), "Song (Part 2)");
}

#[test]
fn test_collapse_whitespace() {
    assert_eq!(collapse_whitespace("  a \n b\t\tc "), "a b c");
    assert_eq!(collapse_whitespace("   "), "");
}

#[test]
fn test_cache_key_ignores_case_and_whitespace() {
    let a = SourceTrack::new("Daft Punk", "Get Lucky", "sp1");
    let b = SourceTrack::new("daft  punk", " GET LUCKY", "other");

    assert_eq!(cache_key(&a), cache_key(&b));
    assert_eq!(cache_key(&a).as_str(), r#"["daft punk","get lucky"]"#);
}

#[test]
fn test_cache_key_separator_in_names() {
    let a = SourceTrack::new("AC|DC", "Thunderstruck", "sp1");
    let b = SourceTrack::new("AC", "DC|Thunderstruck", "sp2");

    assert_ne!(cache_key(&a), cache_key(&b));
}

#[test]
fn test_normalize_fallback_uses_main_artist() {
    let track = SourceTrack::new("Calvin Harris feat. Rihanna", "This Is What You Came For", "sp9");
    let queries = normalize(&track);

    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].artist, "Calvin Harris feat. Rihanna");
    assert_eq!(queries[1].text, "Calvin Harris This Is What You Came For");
    assert_eq!(queries[1].artist, "Calvin Harris");
}

#[test]
fn test_cache_key_distinguishes_titles() {
    let a = SourceTrack::new("Daft Punk", "Get Lucky", "sp1");
    let b = SourceTrack::new("Daft Punk", "Get Lucky (Radio Edit)", "sp2");

    assert_ne!(cache_key(&a), cache_key(&b));
}
