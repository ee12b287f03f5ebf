//! Terminal rendering of track reports.

use crate::models::TrackReport;

fn fmt_count(value: u64) -> String {
    let digits: Vec<char> = value.to_string().chars().rev().collect();
    let mut out = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out.chars().rev().collect()
}

fn fmt_usd(value: f64) -> String {
    format!("${}", fmt_count(value.round().max(0.0) as u64))
}

fn or_not_detected(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "(not detected)",
    }
}

/// Render a readable single-track report.
pub fn format_track_report(report: &TrackReport) -> String {
    let mut lines = Vec::new();
    let score = &report.score;
    let metrics = &report.metrics;
    let parsed = &report.parsed;

    lines.push("=".repeat(72));
    lines.push(format!("Track: {}", report.title));
    if let Some(url) = &report.permalink_url {
        lines.push(format!("URL:   {}", url));
    }
    lines.push("-".repeat(72));
    lines.push(format!(
        "Opportunity Score: {:.1} / 100 [{}]",
        score.overall,
        score.label.as_str()
    ));
    lines.push(format!(
        "  Demand: {:.1}  Conversion: {:.1}  Momentum: {:.1}",
        score.demand, score.conversion, score.momentum
    ));
    lines.push(String::new());
    lines.push("Parsed Title".to_string());
    lines.push(format!(
        "  Original artist: {}",
        or_not_detected(parsed.original_artist.as_deref())
    ));
    lines.push(format!(
        "  Original song:   {}",
        or_not_detected(parsed.original_song.as_deref())
    ));
    lines.push(format!(
        "  Remix artist:    {}",
        or_not_detected(parsed.remix_artist.as_deref())
    ));
    lines.push(String::new());
    lines.push("Engagement".to_string());
    lines.push(format!("  Plays:            {}", fmt_count(metrics.plays)));
    lines.push(format!("  Likes:            {}", fmt_count(metrics.likes)));
    lines.push(format!("  Reposts:          {}", fmt_count(metrics.reposts)));
    lines.push(format!("  Comments:         {}", fmt_count(metrics.comments)));
    lines.push(format!(
        "  Engagement rate:  {:.2}%",
        metrics.engagement_rate * 100.0
    ));
    lines.push(format!(
        "  Daily velocity:   {} plays/day ({} days live)",
        fmt_count(metrics.daily_velocity),
        metrics.days_live
    ));

    if let Some(track) = &report.original_track {
        lines.push(String::new());
        lines.push("Original Track".to_string());
        lines.push(format!("  Name:       {}", track.name));
        lines.push(format!("  Artists:    {}", track.artist_names.join(", ")));
        lines.push(format!("  ISRC:       {}", track.isrc.as_deref().unwrap_or("N/A")));
        lines.push(format!("  Label:      {}", track.label.as_deref().unwrap_or("N/A")));
        lines.push(format!("  Confidence: {:.2}", track.match_confidence));
    }

    lines.push(String::new());
    lines.push("Revenue Projection".to_string());
    for tier in &report.revenue.tiers {
        lines.push(format!(
            "  {:<12} streams={:>14}  all_dsps={}",
            tier.tier,
            fmt_count(tier.estimated_streams),
            fmt_usd(tier.revenue.all_dsps_avg)
        ));
    }
    lines.push(format!("  Recommendation: {}", report.viability.recommendation));

    lines.join("\n")
}

/// Render a ranked summary table for multiple reports.
pub fn format_summary_table(reports: &[TrackReport]) -> String {
    let header = format!(
        "{:<5} {:<8} {:<10} {:>12} {:>10}  Title",
        "Rank", "Score", "Label", "Plays", "DailyVel"
    );
    let mut rows = vec![header.clone(), "-".repeat(header.len())];
    for (index, report) in reports.iter().enumerate() {
        rows.push(format!(
            "{:<5} {:<8.1} {:<10} {:>12} {:>10}  {}",
            index + 1,
            report.score.overall,
            report.score.label.as_str(),
            fmt_count(report.metrics.plays),
            fmt_count(report.metrics.daily_velocity),
            report.title
        ));
    }
    rows.join("\n")
}
