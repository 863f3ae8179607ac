//! HTML rendering of a [`DashboardSnapshot`].
//!
//! The page lists every repository in configuration order. Each pull request
//! gets one line with its number, title and overall status, followed by its
//! stage results unless the checks already passed. Failed repositories keep
//! their header and show a retry notice instead of pull requests.

use indoc::formatdoc;
use pr_dashboard_core::status::{
    CheckRunResult, DashboardSnapshot, PrSummary, RepoPollResult, ReviewTally,
};

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;

/// Shown in place of the pull requests of a repository that failed to poll
pub const RETRY_MESSAGE: &str = "Couldn't retrieve pull requests - retrying";

/// Shown for a pull request without any classified check runs
pub const NO_CHECKS_MESSAGE: &str = "No checks have been run for this PR.";

/// Shown for a repository without open pull requests
pub const NO_PULL_REQUESTS_MESSAGE: &str = "No open pull requests";

/// Titles longer than this are shortened with an ellipsis
pub const MAX_TITLE_CHARS: usize = 80;

const STYLE: &str = "
body { font-family: sans-serif; margin: 1em; }
h2 { border-bottom: 1px solid #ccc; margin-bottom: 0.3em; }
.pr { margin: 0.2em 0; }
.number { color: #c80000; font-size: 80%; }
.draft { color: #777; font-size: 80%; }
.author, .reviews, .empty, .updated { color: #777; font-size: 80%; }
.checks { margin-left: 1.5em; font-size: 80%; }
.stage { background: #777; color: #fff; padding: 0 0.3em; margin-right: 0.2em; }
.success { color: #2a7d2a; }
.failure, .timed_out, .warning { color: #c80000; }
.queued, .in_progress { color: #b08000; }
.skipped, .neutral, .unknown { color: #777; }
";

/// Renders the full dashboard page.
///
/// The page reloads itself after the snapshot's effective refresh interval.
pub fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut body = String::new();
    for repository in &snapshot.repositories {
        render_repository(&mut body, repository, &snapshot.stage_order);
    }

    formatdoc! {r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
        <meta charset="utf-8">
        <meta http-equiv="refresh" content="{refresh}">
        <title>{title}</title>
        <style>{style}</style>
        </head>
        <body>
        <h1>{title}</h1>
        {body}<p class="updated">Updated {updated}</p>
        </body>
        </html>
        "#,
        refresh = snapshot.effective_refresh_seconds(),
        title = escape_html(&snapshot.title),
        style = STYLE,
        body = body,
        updated = snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    }
}

fn render_repository(out: &mut String, repository: &RepoPollResult, stage_order: &[String]) {
    out.push_str("<section class=\"repository\">\n");
    if repository.failed {
        out.push_str(&format!(
            "<h2>{} <span class=\"warning\" title=\"{}\">&#9888;</span></h2>\n",
            escape_html(&repository.repo_id),
            escape_html(repository.failure.as_deref().unwrap_or_default()),
        ));
        out.push_str(&format!("<p class=\"warning\">{}</p>\n", RETRY_MESSAGE));
    } else {
        out.push_str(&format!(
            "<h2>{}</h2>\n",
            escape_html(&repository.repo_id)
        ));
        if repository.summaries.is_empty() {
            out.push_str(&format!(
                "<p class=\"empty\">{}</p>\n",
                NO_PULL_REQUESTS_MESSAGE
            ));
        }
        for summary in &repository.summaries {
            render_pull_request(out, summary, stage_order);
        }
    }
    out.push_str("</section>\n");
}

fn render_pull_request(out: &mut String, summary: &PrSummary, stage_order: &[String]) {
    let number = match &summary.url {
        Some(url) => format!(
            "<a class=\"number\" href=\"{}\">#{}</a>",
            escape_html(url),
            summary.number
        ),
        None => format!("<span class=\"number\">#{}</span>", summary.number),
    };

    out.push_str("<div class=\"pr\">");
    out.push_str(&number);
    out.push(' ');
    if summary.draft {
        out.push_str("<span class=\"draft\">[draft]</span> ");
    }
    out.push_str(&format!(
        "<span class=\"title\" title=\"{}\">{}</span> ",
        escape_html(&summary.title),
        escape_html(&elide(&summary.title, MAX_TITLE_CHARS))
    ));
    out.push_str(&status_icon(summary.status));
    if let Some(author) = &summary.author {
        out.push_str(&format!(
            " <span class=\"author\">by {}</span>",
            escape_html(author)
        ));
    }
    if let Some(reviews) = &summary.reviews {
        out.push_str(&format!(
            " <span class=\"reviews\">{}</span>",
            describe_reviews(reviews)
        ));
    }
    out.push_str("</div>\n");

    // Passing pull requests don't need their individual checks shown
    if summary.status == Some(CheckRunResult::Success) {
        return;
    }

    match &summary.checks {
        Some(checks) => {
            out.push_str("<div class=\"checks\">");
            for stage in stage_order {
                let Some(results) = checks.get(stage) else {
                    continue;
                };
                out.push_str(&format!(
                    "<span class=\"stage\">{}</span>",
                    escape_html(stage)
                ));
                for result in results {
                    out.push_str(&status_icon(Some(*result)));
                }
                out.push(' ');
            }
            out.push_str("</div>\n");
        }
        None => out.push_str(&format!(
            "<div class=\"checks empty\">{}</div>\n",
            NO_CHECKS_MESSAGE
        )),
    }
}

/// Returns the icon markup for a check result. A missing result renders as unknown.
pub fn status_icon(result: Option<CheckRunResult>) -> String {
    let result = result.unwrap_or(CheckRunResult::Unknown);
    let symbol = match result {
        CheckRunResult::Queued => "&#8230;",
        CheckRunResult::InProgress => "&#9654;",
        CheckRunResult::Success => "&#10004;",
        CheckRunResult::Failure => "&#10006;",
        CheckRunResult::Skipped => "&#187;",
        CheckRunResult::Neutral => "&#8211;",
        CheckRunResult::TimedOut => "&#8987;",
        CheckRunResult::Unknown => "&#9675;",
    };

    format!(
        "<span class=\"{result}\" title=\"{result}\">{symbol}</span>",
        result = result.as_str(),
        symbol = symbol
    )
}

fn describe_reviews(reviews: &ReviewTally) -> String {
    let mut parts = Vec::new();
    if reviews.approvals > 0 {
        parts.push(format!("{} approved", reviews.approvals));
    }
    if reviews.changes_requested > 0 {
        parts.push(format!("{} changes requested", reviews.changes_requested));
    }
    if reviews.comments > 0 {
        parts.push(format!("{} commented", reviews.comments));
    }
    parts.join(", ")
}

/// Shortens `text` to at most `max_chars` characters, ending in "..." when cut.
pub fn elide(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
