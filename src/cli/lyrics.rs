//! `lyricdeck lyrics`: print a parsed LRC file

use lyricdeck::features::lyrics::{LyricLine, format_timestamp, line_index_at, load_lrc_file};

use super::LyricsArgs;

fn render(lines: &[LyricLine], at: Option<f64>) -> Vec<String> {
    let highlighted = at.and_then(|position| line_index_at(lines, position));
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let marker = if Some(i) == highlighted { '>' } else { ' ' };
            format!("{} {} {}", marker, format_timestamp(line.time), line.text)
        })
        .collect()
}

pub fn run(args: &LyricsArgs) -> anyhow::Result<()> {
    let lines = load_lrc_file(&args.file)?;
    if lines.is_empty() {
        anyhow::bail!("No timed lines in {}", args.file.display());
    }
    for line in render(&lines, args.at) {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_marks_active_line() {
        let lines = vec![
            LyricLine::new(1.0, "one"),
            LyricLine::new(4.0, "two"),
            LyricLine::new(9.5, "three"),
        ];
        let out = render(&lines, Some(5.0));
        assert_eq!(out[0], "  [00:01.000] one");
        assert_eq!(out[1], "> [00:04.000] two");
        assert_eq!(out[2], "  [00:09.500] three");

        assert!(render(&lines, None).iter().all(|l| l.starts_with(' ')));
    }
}
