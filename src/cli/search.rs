//! `lyricdeck search`: list catalog matches

use lyricdeck::api::{Catalog, Track};

use super::{SearchArgs, catalog_client};

fn format_results(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let lyrics = if track.lyric_url().is_some() { " [lrc]" } else { "" };
            format!(
                "{:>3}. {} - {}{}",
                i + 1,
                track.display_title(),
                track.display_artist(),
                lyrics
            )
        })
        .collect()
}

pub async fn run(args: &SearchArgs) -> anyhow::Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        anyhow::bail!("Search term is empty");
    }
    let settings = args.api.settings();
    let client = catalog_client(&settings)?;
    let tracks = client.search(query).await?;
    tracing::debug!("Search \"{}\" returned {} tracks", query, tracks.len());

    if tracks.is_empty() {
        println!("No results for \"{}\"", query);
        return Ok(());
    }
    for line in format_results(&tracks) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_results() {
        let tracks = vec![
            Track::single("Blue", "https://x/b.mp3", Some("Band"), Some("https://x/b.lrc")),
            Track::single("", "https://x/c.mp3", None, None),
        ];
        assert_eq!(
            format_results(&tracks),
            vec![
                "  1. Blue - Band [lrc]".to_string(),
                "  2. Unknown title - Unknown artist".to_string(),
            ]
        );
    }
}
