//! Server-rendered pages.
//!
//! User-derived text is escaped; visualization fragments are inserted
//! verbatim.

use chrono::SecondsFormat;

use crate::models::listing::ListingContext;
use crate::models::user::User;
use crate::visualization::embed::Fragments;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2rem; color: #222; }
table.targets { border-collapse: collapse; width: 100%; margin: 1rem 0; }
table.targets th, table.targets td { border-bottom: 1px solid #ddd; padding: 0.4rem 0.6rem; text-align: left; }
form.filter { display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: end; }
nav.pagination { display: flex; gap: 1rem; }
.muted { color: #777; }
"#;

pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, user: Option<&User>, body: &str) -> String {
    let session = match user {
        Some(user) => format!(
            r#"<form method="post" action="/logout">{} <button type="submit">Log out</button></form>"#,
            html_escape(&user.username)
        ),
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <header>{session}</header>
    {body}
</body>
</html>"#,
        title = html_escape(title),
    )
}

// ────────────────────────────────────────────────────────────────
// Target list
// ────────────────────────────────────────────────────────────────

fn page_link(query_string: &str, page: usize) -> String {
    if query_string.is_empty() {
        format!("?page={}", page)
    } else {
        format!("?{}&page={}", html_escape(query_string), page)
    }
}

fn render_filter_form(listing: &ListingContext) -> String {
    let value = |v: &Option<String>| html_escape(v.as_deref().unwrap_or_default());
    let filter = &listing.filter;

    let kinds = ["SIDEREAL", "NON_SIDEREAL"]
        .iter()
        .map(|kind| {
            let selected = filter
                .kind
                .as_deref()
                .is_some_and(|v| v.eq_ignore_ascii_case(kind));
            format!(
                r#"<option value="{kind}"{}>{kind}</option>"#,
                if selected { " selected" } else { "" }
            )
        })
        .collect::<String>();

    let lists = listing
        .target_lists
        .iter()
        .map(|list| {
            let selected = filter.target_list.as_deref() == Some(list.id.to_string().as_str());
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                list.id,
                if selected { " selected" } else { "" },
                html_escape(&list.name)
            )
        })
        .collect::<String>();

    format!(
        r#"<form class="filter" method="get">
        <label>Name <input type="text" name="name" value="{name}"></label>
        <label>Type <select name="type"><option value="">---------</option>{kinds}</select></label>
        <label>Target list <select name="targetlist__name"><option value="">---------</option>{lists}</select></label>
        <label>Key <input type="text" name="key" value="{key}"></label>
        <label>Value <input type="text" name="value" value="{val}"></label>
        <button type="submit">Filter</button>
    </form>"#,
        name = value(&filter.name),
        key = value(&filter.key),
        val = value(&filter.value),
    )
}

fn render_target_rows(listing: &ListingContext) -> String {
    if listing.page.items.is_empty() {
        return r#"<tr><td colspan="5" class="muted">No targets yet.</td></tr>"#.to_string();
    }
    listing
        .page
        .items
        .iter()
        .map(|target| {
            let coord = |v: Option<f64>| v.map(|v| format!("{:.4}", v)).unwrap_or_default();
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(&target.name),
                target.kind,
                coord(target.ra),
                coord(target.dec),
                target.created.to_rfc3339_opts(SecondsFormat::Secs, true)
            )
        })
        .collect()
}

fn render_pagination(listing: &ListingContext) -> String {
    let page = &listing.page;
    let previous = if page.has_previous() {
        format!(
            r#"<a href="{}">&laquo; first</a> <a href="{}">previous</a>"#,
            page_link(&listing.query_string, 1),
            page_link(&listing.query_string, page.number - 1)
        )
    } else {
        String::new()
    };
    let next = if page.has_next() {
        format!(
            r#"<a href="{}">next</a> <a href="{}">last &raquo;</a>"#,
            page_link(&listing.query_string, page.number + 1),
            page_link(&listing.query_string, page.num_pages)
        )
    } else {
        String::new()
    };
    let shown = match page.start_index() {
        0 => String::new(),
        start => format!(
            r#" <span class="muted">(rows {} to {})</span>"#,
            start,
            start + page.items.len() - 1
        ),
    };
    format!(
        r#"<nav class="pagination">{previous}<span>Page {} of {}</span>{shown}{next}</nav>"#,
        page.number, page.num_pages
    )
}

/// The target listing page with the embedded visualization.
pub fn render_table_list(user: &User, listing: &ListingContext, fragments: &Fragments) -> String {
    let body = format!(
        r#"<h1>Targets</h1>
    <p class="muted">{total} targets</p>
    {filter}
    <table class="targets">
        <thead><tr><th>Name</th><th>Type</th><th>RA</th><th>Dec</th><th>Created</th></tr></thead>
        <tbody>{rows}</tbody>
    </table>
    {pagination}
    <section class="visualization">
    {divs}
    {script}
    </section>"#,
        total = listing.page.total_count,
        filter = render_filter_form(listing),
        rows = render_target_rows(listing),
        pagination = render_pagination(listing),
        divs = fragments.divs.join("\n    "),
        script = fragments.script,
    );
    layout("Targets", Some(user), &body)
}

// ────────────────────────────────────────────────────────────────
// Login
// ────────────────────────────────────────────────────────────────

pub fn render_login(next: &str, error: Option<&str>) -> String {
    let error = error
        .map(|error| format!(r#"<p class="error">{}</p>"#, html_escape(error)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1>
    {error}
    <form method="post" action="/login">
        <input type="hidden" name="next" value="{next}">
        <label>Username <input type="text" name="username" autofocus></label>
        <label>Password <input type="password" name="password"></label>
        <button type="submit">Log in</button>
    </form>"#,
        next = html_escape(next),
    );
    layout("Log in", None, &body)
}
