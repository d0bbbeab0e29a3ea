//! HTML rendering for the page server.

use std::fmt::Write;

use time::format_description::well_known::Rfc3339;

use crate::client::ServiceError;
use crate::models::{Crawl, Instance, Page};

const STYLE: &str = "body{font-family:sans-serif;max-width:64rem;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}th,td{text-align:left;padding:.3rem .6rem;\
border-bottom:1px solid #ddd}.status-up,.status-completed{color:#2a7}\
.status-down,.status-failed,.status-timeout,.status-internal_error{color:#c33}\
.status-blocked,.status-unhealthy{color:#c80}nav a{margin-right:1rem}";

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a value for a query string.
fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Percent-encode a value for a single path segment.
fn encode_segment(value: &str) -> String {
    // Literal '+' is already %2B, so any remaining '+' stands for a space.
    encode_query(value).replace('+', "%20")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Fediverse Browser</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Instances</a><a href=\"/about\">About</a></nav>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn count(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn pager(page: &Page<impl Sized>, link: impl Fn(u32) -> String) -> String {
    let mut out = String::from("<p class=\"pager\">");
    if page.has_previous() {
        let _ = write!(out, "<a href=\"{}\">&larr; Previous</a> ", escape(&link(page.page - 1)));
    }
    let _ = write!(
        out,
        "Page {} of {} ({} total)",
        page.page,
        page.page_count().max(1),
        page.total
    );
    if let Some(next) = page.page.checked_add(1).filter(|_| page.has_next()) {
        let _ = write!(out, " <a href=\"{}\">Next &rarr;</a>", escape(&link(next)));
    }
    out.push_str("</p>");
    out
}

/// Home page: the instance list.
pub fn instance_list(page: &Page<Instance>, software: Option<&str>) -> String {
    let mut body = String::from("<h1>Instances</h1>\n");
    if let Some(software) = software {
        let _ = writeln!(body, "<p>Filtered by software: <b>{}</b></p>", escape(software));
    }

    if page.is_empty() {
        body.push_str("<p>No instances found.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Domain</th><th>Status</th><th>Software</th>\
             <th>Users</th><th>Monthly active</th><th>Posts</th></tr>\n",
        );
        for instance in &page.results {
            let _ = writeln!(
                body,
                "<tr><td><a href=\"/instances/{id}\">{domain}</a></td>\
                 <td class=\"status-{status}\">{status}</td><td>{software}</td>\
                 <td>{users}</td><td>{monthly}</td><td>{posts}</td></tr>",
                id = escape(&encode_segment(&instance.id)),
                domain = escape(&instance.domain),
                status = instance.status.as_str(),
                software = escape(&instance.software_label().unwrap_or_default()),
                users = count(instance.total_users),
                monthly = count(instance.active_users_month),
                posts = count(instance.local_posts),
            );
        }
        body.push_str("</table>\n");
    }

    let filter = software
        .map(|s| format!("&software={}", encode_query(s)))
        .unwrap_or_default();
    body.push_str(&pager(page, |n| format!("/?page={}{}", n, filter)));

    layout("Instances", &body)
}

/// Instance detail page with crawl history.
pub fn instance_detail(
    instance: &Instance,
    crawls: Result<&Page<Crawl>, &ServiceError>,
) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape(&instance.domain));
    if let Some(description) = &instance.description {
        let _ = writeln!(body, "<p>{}</p>", escape(description));
    }

    let registrations = match instance.open_registrations {
        Some(true) => "open",
        Some(false) => "closed",
        None => "-",
    };
    let _ = writeln!(
        body,
        "<table>\n<tr><th>Status</th><td class=\"status-{status}\">{status}</td></tr>\n\
         <tr><th>Software</th><td>{software}</td></tr>\n\
         <tr><th>Registrations</th><td>{registrations}</td></tr>\n\
         <tr><th>Peers</th><td>{peers}</td></tr>\n\
         <tr><th>Users</th><td>{users}</td></tr>\n\
         <tr><th>Active (half year)</th><td>{half_year}</td></tr>\n\
         <tr><th>Active (month)</th><td>{month}</td></tr>\n\
         <tr><th>Posts</th><td>{posts}</td></tr>\n\
         <tr><th>Comments</th><td>{comments}</td></tr>\n</table>",
        status = instance.status.as_str(),
        software = escape(&instance.software_label().unwrap_or_else(|| "-".to_string())),
        peers = count(instance.number_of_peers),
        users = count(instance.total_users),
        half_year = count(instance.active_users_half_year),
        month = count(instance.active_users_month),
        posts = count(instance.local_posts),
        comments = count(instance.local_comments),
    );

    body.push_str("<h2>Crawls</h2>\n");
    match crawls {
        Ok(page) if page.is_empty() => body.push_str("<p>No crawls recorded.</p>\n"),
        Ok(page) => {
            body.push_str(
                "<table>\n<tr><th>Started</th><th>Status</th><th>Duration</th>\
                 <th>Users</th><th>Posts</th><th>Error</th></tr>\n",
            );
            for crawl in &page.results {
                let started = crawl
                    .started_at
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| "-".to_string());
                let _ = writeln!(
                    body,
                    "<tr><td>{started}</td><td class=\"status-{status}\">{status}</td>\
                     <td>{duration:.2}s</td><td>{users}</td><td>{posts}</td><td>{error}</td></tr>",
                    started = escape(&started),
                    status = crawl.status.as_str(),
                    duration = crawl.elapsed_seconds(),
                    users = count(crawl.total_users),
                    posts = count(crawl.local_posts),
                    error = escape(crawl.error_text().unwrap_or("")),
                );
            }
            body.push_str("</table>\n");
            let id = encode_segment(&instance.id);
            body.push_str(&pager(page, |n| format!("/instances/{}?page={}", id, n)));
        }
        Err(error) => {
            let _ = writeln!(
                body,
                "<p class=\"error\">Could not load crawls: {}</p>",
                escape(&error.message())
            );
        }
    }

    layout(&instance.domain, &body)
}

/// Static about page.
pub fn about() -> String {
    layout(
        "About",
        "<h1>About</h1>\n<p>Browse fediverse instances discovered by the crawler, \
         their current status and the history of every crawl.</p>",
    )
}

/// Not-found page.
pub fn not_found(path: &str) -> String {
    layout(
        "Not found",
        &format!(
            "<h1>Not found</h1>\n<p>Nothing lives at <code>{}</code>.</p>",
            escape(path)
        ),
    )
}

/// Error page for service or transport failures.
pub fn error_page(status: u16, message: &str) -> String {
    layout(
        "Error",
        &format!(
            "<h1>Error {}</h1>\n<p class=\"error\">{}</p>",
            status,
            escape(message)
        ),
    )
}
