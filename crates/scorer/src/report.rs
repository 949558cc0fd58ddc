use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, ScoreError};
use crate::pipeline::ScoredWallet;

pub const HEADER: &str = "wallet_id,score";

pub fn render_scores(wallets: &[ScoredWallet], out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for w in wallets {
        writeln!(out, "{},{}", w.wallet_id, w.final_score)?;
    }
    Ok(())
}

/// Write the score table next to `path` and rename it into place once complete,
/// so a failed run never leaves a partial table behind.
pub fn write_scores(path: &Path, wallets: &[ScoredWallet]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| ScoreError::io(dir, e))?;

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ScoreError::io(dir, e))?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        render_scores(wallets, &mut out).map_err(|e| ScoreError::io(tmp.path(), e))?;
        out.flush().map_err(|e| ScoreError::io(tmp.path(), e))?;
    }
    tmp.persist(path)
        .map_err(|e| ScoreError::io(path, e.error))?;

    tracing::info!(path = %path.display(), rows = wallets.len(), "score table written");
    Ok(())
}

/// One JSON object per wallet with every intermediate value.
pub fn render_breakdown(wallets: &[ScoredWallet], out: &mut impl Write) -> anyhow::Result<()> {
    for w in wallets {
        serde_json::to_writer(&mut *out, w)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_source::SimulatedFeatureSource;
    use crate::pipeline::{score_batch, ScoringParams};

    fn scored(ids: &[&str]) -> Vec<ScoredWallet> {
        let ids: Vec<String> = ids.iter().map(|s| (*s).to_string()).collect();
        score_batch(
            &ids,
            &mut SimulatedFeatureSource::new(42),
            &ScoringParams::default(),
        )
        .unwrap()
        .wallets
    }

    #[test]
    fn test_render_has_header_and_one_row_per_wallet() {
        let wallets = scored(&["0xb", "0xa"]);
        let mut buf = Vec::new();
        render_scores(&wallets, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "wallet_id,score");
        assert!(lines[1].starts_with("0xb,"));
        assert!(lines[2].starts_with("0xa,"));
        let score: u32 = lines[1].split(',').nth(1).unwrap().parse().unwrap();
        assert!(score <= 1000);
    }

    #[test]
    fn test_write_scores_creates_parent_and_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("wallet_risk.csv");

        write_scores(&path, &scored(&["0x1", "0x2"])).unwrap();
        write_scores(&path, &scored(&["0x3"])).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("0x3,"));

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1, "temp file should have been renamed into place");
    }

    #[test]
    fn test_empty_batch_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet_risk.csv");
        write_scores(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "wallet_id,score\n");
    }

    #[test]
    fn test_breakdown_is_json_lines() {
        let wallets = scored(&["0x1", "0x2"]);
        let mut buf = Vec::new();
        render_breakdown(&wallets, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["wallet_id"], "0x1");
        assert!(rows[0]["sub_scores"]["history"].is_number());
        assert!(rows[1]["derived"]["wallet_age_days"].as_i64().unwrap() >= 1);
    }
}
